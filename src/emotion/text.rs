// src/emotion/text.rs
//
// Lexicon-based text affect estimation. Matched emotion words contribute
// their VAD anchors, scaled by a preceding intensity modifier; the mean of
// the contributions becomes the text channel's VAD score.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::normalize::normalize_vad;
use super::types::{Intensity, TextAnalysis, VadScore};

/// Multiplier applied by booster words ("really", "very", ...).
const BOOST_MULTIPLIER: f64 = 1.5;

/// Multiplier applied by diminisher words ("slightly", "a bit", ...).
const DIMINISH_MULTIPLIER: f64 = 0.7;

static BOOSTERS: &[&str] = &["really", "very", "extremely", "totally", "completely", "so"];
static DIMINISHERS: &[&str] = &["slightly", "somewhat", "barely", "little"];

/// Emotion word → VAD anchor. Substring matching, so "happiness" hits "happ".
static EMOTION_LEXICON: Lazy<HashMap<&'static str, VadScore>> = Lazy::new(|| {
    let mut lexicon = HashMap::new();

    // Positive
    lexicon.insert("happ", VadScore::new(0.9, 0.6, 0.7));
    lexicon.insert("joy", VadScore::new(0.9, 0.7, 0.8));
    lexicon.insert("glad", VadScore::new(0.8, 0.5, 0.6));
    lexicon.insert("excit", VadScore::new(0.9, 0.9, 0.8));
    lexicon.insert("thrill", VadScore::new(0.85, 0.8, 0.7));
    lexicon.insert("proud", VadScore::new(0.8, 0.6, 0.9));
    lexicon.insert("confiden", VadScore::new(0.7, 0.6, 0.9));
    lexicon.insert("grateful", VadScore::new(0.9, 0.5, 0.6));
    lexicon.insert("content", VadScore::new(0.8, 0.4, 0.7));
    lexicon.insert("relax", VadScore::new(0.7, 0.2, 0.5));
    lexicon.insert("peace", VadScore::new(0.7, 0.2, 0.6));
    lexicon.insert("calm", VadScore::new(0.7, 0.2, 0.6));

    // Negative
    lexicon.insert("hard", VadScore::new(0.2, 0.6, 0.2));
    lexicon.insert("stress", VadScore::new(0.2, 0.8, 0.3));
    lexicon.insert("angr", VadScore::new(0.1, 0.9, 0.8));
    lexicon.insert("furious", VadScore::new(0.1, 0.9, 0.8));
    lexicon.insert("depress", VadScore::new(0.2, 0.2, 0.1));
    lexicon.insert("worr", VadScore::new(0.3, 0.7, 0.2));
    lexicon.insert("anxi", VadScore::new(0.3, 0.8, 0.2));
    lexicon.insert("sad", VadScore::new(0.1, 0.3, 0.2));
    lexicon.insert("disappoint", VadScore::new(0.2, 0.4, 0.2));
    lexicon.insert("annoy", VadScore::new(0.2, 0.8, 0.6));
    lexicon.insert("frustrat", VadScore::new(0.2, 0.7, 0.3));
    lexicon.insert("afraid", VadScore::new(0.1, 0.8, 0.2));
    lexicon.insert("scare", VadScore::new(0.1, 0.8, 0.2));
    lexicon.insert("lonel", VadScore::new(0.2, 0.3, 0.2));
    lexicon.insert("tired", VadScore::new(0.3, 0.2, 0.3));

    lexicon
});

/// Analyze a free-text message into a full text-channel result.
/// Empty or lexicon-free input falls back to the neutral point.
pub fn analyze_text(text: &str) -> TextAnalysis {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return default_analysis();
    }

    let vad_score = vad_from_text(trimmed);
    let keywords = extract_keywords(trimmed);
    let confidence = keyword_confidence(trimmed, &keywords);
    let intensity = analyze_intensity(trimmed);
    let primary_emotion = super::classify::classify_emotion(&vad_score);

    TextAnalysis {
        vad_score,
        confidence,
        keywords,
        primary_emotion: Some(primary_emotion.as_str().to_string()),
        intensity: Some(intensity),
    }
}

/// Mean of matched VAD anchors, with booster/diminisher words scaling the
/// following emotion word only.
fn vad_from_text(text: &str) -> VadScore {
    let mut total = VadScore::new(0.0, 0.0, 0.0);
    let mut matched = 0usize;
    let mut multiplier = 1.0;

    for word in text.to_lowercase().split_whitespace() {
        if BOOSTERS.contains(&word) {
            multiplier = BOOST_MULTIPLIER;
            continue;
        }
        if DIMINISHERS.contains(&word) {
            multiplier = DIMINISH_MULTIPLIER;
            continue;
        }

        if let Some(anchor) = lookup(word) {
            total.valence += anchor.valence * multiplier;
            total.arousal += anchor.arousal * multiplier;
            total.dominance += anchor.dominance * multiplier;
            matched += 1;
        }
        multiplier = 1.0;
    }

    if matched == 0 {
        return VadScore::NEUTRAL;
    }

    normalize_vad(VadScore::new(
        total.valence / matched as f64,
        total.arousal / matched as f64,
        total.dominance / matched as f64,
    ))
}

fn lookup(word: &str) -> Option<&'static VadScore> {
    EMOTION_LEXICON
        .iter()
        .find(|(stem, _)| word.contains(*stem))
        .map(|(_, anchor)| anchor)
}

fn extract_keywords(text: &str) -> Vec<String> {
    let mut keywords = Vec::new();
    for word in text.to_lowercase().split_whitespace() {
        if let Some((stem, _)) = EMOTION_LEXICON.iter().find(|(stem, _)| word.contains(*stem)) {
            keywords.push(stem.to_string());
        }
    }
    keywords
}

/// Confidence grows with the share of emotion-bearing words, clamped so a
/// single hit still counts and a keyword-dense rant is not treated as certain.
fn keyword_confidence(text: &str, keywords: &[String]) -> f64 {
    let word_count = text.split_whitespace().count().max(1);
    let ratio = keywords.len() as f64 / word_count as f64;
    (ratio * 2.0).clamp(0.3, 0.95)
}

fn analyze_intensity(text: &str) -> Intensity {
    let lower = text.to_lowercase();
    if BOOSTERS.iter().any(|w| lower.split_whitespace().any(|t| t == *w)) {
        Intensity::High
    } else if DIMINISHERS.iter().any(|w| lower.split_whitespace().any(|t| t == *w)) {
        Intensity::Low
    } else {
        Intensity::Medium
    }
}

fn default_analysis() -> TextAnalysis {
    TextAnalysis {
        vad_score: VadScore::NEUTRAL,
        confidence: 0.3,
        keywords: Vec::new(),
        primary_emotion: Some("neutral".to_string()),
        intensity: Some(Intensity::Medium),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_neutral() {
        let analysis = analyze_text("   ");
        assert_eq!(analysis.vad_score, VadScore::NEUTRAL);
        assert_eq!(analysis.confidence, 0.3);
        assert!(analysis.keywords.is_empty());
    }

    #[test]
    fn test_no_keywords_is_neutral() {
        let analysis = analyze_text("the meeting is at three tomorrow");
        assert_eq!(analysis.vad_score, VadScore::NEUTRAL);
    }

    #[test]
    fn test_negative_text() {
        let analysis = analyze_text("I feel so stressed and anxious today");
        assert!(analysis.vad_score.valence < 0.4);
        assert!(analysis.vad_score.arousal > 0.6);
        assert!(analysis.keywords.contains(&"stress".to_string()));
        assert!(analysis.keywords.contains(&"anxi".to_string()));
        assert_eq!(analysis.intensity, Some(Intensity::High));
    }

    #[test]
    fn test_positive_text() {
        let analysis = analyze_text("I am happy and grateful");
        assert!(analysis.vad_score.valence > 0.7);
        assert_eq!(analysis.primary_emotion.as_deref(), Some("happy"));
    }

    #[test]
    fn test_booster_raises_arousal_contribution() {
        let plain = analyze_text("I am worried");
        let boosted = analyze_text("I am really worried");
        assert!(boosted.vad_score.arousal > plain.vad_score.arousal);
        assert_eq!(boosted.intensity, Some(Intensity::High));
    }

    #[test]
    fn test_diminisher_lowers_intensity() {
        let analysis = analyze_text("I am slightly annoyed");
        assert_eq!(analysis.intensity, Some(Intensity::Low));
    }

    #[test]
    fn test_vad_always_in_range() {
        // Boosted anchors could exceed 1.0 before normalization.
        let analysis = analyze_text("really excited really joyful really thrilled");
        for dim in [
            analysis.vad_score.valence,
            analysis.vad_score.arousal,
            analysis.vad_score.dominance,
        ] {
            assert!((0.0..=1.0).contains(&dim));
        }
    }
}
