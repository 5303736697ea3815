// src/emotion/classify.rs
//
// Maps a fused VAD score onto the discrete emotion label set, plus a small
// set of free-text secondary descriptors. The primary table is strict
// first-match so classification stays total and deterministic.

use super::types::{EmotionTag, ModalityInput, VadScore};

/// Facial emotion scores below this are too weak to surface as descriptors.
const SECONDARY_EMOTION_THRESHOLD: f64 = 0.3;

/// Maximum number of secondary descriptors reported.
const MAX_SECONDARY_EMOTIONS: usize = 3;

/// Classify a VAD score into a primary emotion label.
///
/// First matching row wins; valence in (0.3, 0.4] deliberately falls through
/// to neutral regardless of arousal.
pub fn classify_emotion(vad: &VadScore) -> EmotionTag {
    let (v, a) = (vad.valence, vad.arousal);

    if v > 0.7 && a > 0.6 {
        EmotionTag::Excited
    } else if v > 0.7 {
        EmotionTag::Happy
    } else if v <= 0.3 && a > 0.6 {
        EmotionTag::Angry
    } else if v <= 0.3 {
        EmotionTag::Sad
    } else if v > 0.4 && a > 0.6 {
        EmotionTag::Surprised
    } else if v > 0.4 {
        EmotionTag::Calm
    } else {
        EmotionTag::Neutral
    }
}

/// Derive secondary descriptors: independent VAD facets first, then any
/// facial raw emotion labels scoring above the threshold. Deduplicated,
/// capped, first-found order preserved.
pub fn secondary_emotions(vad: &VadScore, input: &ModalityInput) -> Vec<String> {
    let mut emotions: Vec<String> = Vec::new();

    if vad.valence > 0.6 {
        emotions.push("positive".into());
    }
    if vad.valence < 0.4 {
        emotions.push("negative".into());
    }
    if vad.arousal > 0.6 {
        emotions.push("activated".into());
    }
    if vad.arousal < 0.4 {
        emotions.push("calm".into());
    }
    if vad.dominance > 0.6 {
        emotions.push("dominant".into());
    }
    if vad.dominance < 0.4 {
        emotions.push("submissive".into());
    }

    // Raw facial labels arrive as an unordered map; order by descending
    // score then label so the output is deterministic.
    if let Some(facial) = &input.facial {
        let mut detected: Vec<(&String, f64)> = facial
            .emotions
            .iter()
            .filter(|(_, score)| **score > SECONDARY_EMOTION_THRESHOLD)
            .map(|(label, score)| (label, *score))
            .collect();
        detected.sort_by(|(la, sa), (lb, sb)| {
            sb.partial_cmp(sa)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| la.cmp(lb))
        });
        emotions.extend(detected.into_iter().map(|(label, _)| label.clone()));
    }

    let mut seen = std::collections::HashSet::new();
    emotions.retain(|e| seen.insert(e.clone()));
    emotions.truncate(MAX_SECONDARY_EMOTIONS);
    emotions
}
