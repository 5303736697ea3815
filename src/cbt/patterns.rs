// src/cbt/patterns.rs
//
// Longitudinal pattern analysis over a session's emotion history. The
// history is an injected read-only list of persisted snapshots; nothing
// here owns or mutates session state.

use serde::{Deserialize, Serialize};

use crate::emotion::types::{EmotionSnapshot, VadScore};

/// Deltas smaller than this are treated as noise.
const TREND_THRESHOLD: f64 = 0.1;

/// Share of history entries an emotion must reach to count as frequent.
const FREQUENT_SHARE: f64 = 0.3;

/// How many trailing snapshots the trend window covers.
const TREND_WINDOW: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternAnalysis {
    pub patterns: Vec<String>,
    pub trends: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Analyze recurring emotions and short-term VAD trends. Fewer than two
/// entries is not an error; it reports that more observation is needed.
pub fn analyze_emotion_patterns(history: &[EmotionSnapshot]) -> PatternAnalysis {
    if history.len() < 2 {
        return PatternAnalysis {
            patterns: vec!["Not enough data collected yet".to_string()],
            trends: vec!["More observations are needed".to_string()],
            recommendations: vec!["Keep recording your emotions regularly".to_string()],
        };
    }

    let mut patterns = Vec::new();
    let mut trends = Vec::new();
    let mut recommendations = Vec::new();

    let window_start = history.len().saturating_sub(TREND_WINDOW);
    let recent: Vec<VadScore> = history[window_start..].iter().map(|h| h.vad_score).collect();

    let valence_delta = last_step_delta(&recent, |v| v.valence);
    let arousal_delta = last_step_delta(&recent, |v| v.arousal);
    let dominance_delta = last_step_delta(&recent, |v| v.dominance);

    if valence_delta > TREND_THRESHOLD {
        trends.push("Positive affect is gradually improving".to_string());
        recommendations.push("Keep up the activities that support this change".to_string());
    } else if valence_delta < -TREND_THRESHOLD {
        trends.push("Negative affect is trending upward".to_string());
        recommendations.push("Lean more actively on cognitive restructuring".to_string());
    }

    if arousal_delta > TREND_THRESHOLD {
        trends.push("Emotional activation is increasing".to_string());
        recommendations.push("Practice a calming technique regularly".to_string());
    }

    if dominance_delta > TREND_THRESHOLD {
        trends.push("Confidence is improving".to_string());
        recommendations.push("Continue activities that build self-efficacy".to_string());
    }

    let frequent = frequent_emotions(history);
    if !frequent.is_empty() {
        patterns.push(format!("Frequently observed emotions: {}", frequent.join(", ")));
    }

    PatternAnalysis { patterns, trends, recommendations }
}

/// Delta between the two most recent values of the window.
fn last_step_delta(values: &[VadScore], dim: impl Fn(&VadScore) -> f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    dim(&values[values.len() - 1]) - dim(&values[values.len() - 2])
}

/// Emotions appearing in more than FREQUENT_SHARE of entries, in order of
/// first appearance.
fn frequent_emotions(history: &[EmotionSnapshot]) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for snapshot in history {
        match counts.iter_mut().find(|(label, _)| *label == snapshot.primary_emotion) {
            Some((_, count)) => *count += 1,
            None => counts.push((snapshot.primary_emotion.clone(), 1)),
        }
    }

    let threshold = history.len() as f64 * FREQUENT_SHARE;
    counts
        .into_iter()
        .filter(|(_, count)| *count as f64 > threshold)
        .map(|(label, _)| label)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn snapshot(emotion: &str, vad: VadScore, offset_minutes: i64) -> EmotionSnapshot {
        EmotionSnapshot {
            timestamp: Utc::now() + Duration::minutes(offset_minutes),
            primary_emotion: emotion.to_string(),
            vad_score: vad,
        }
    }

    #[test]
    fn test_insufficient_history() {
        let analysis = analyze_emotion_patterns(&[snapshot("sad", VadScore::NEUTRAL, 0)]);
        assert_eq!(analysis.patterns, vec!["Not enough data collected yet".to_string()]);
    }

    #[test]
    fn test_improving_valence_trend() {
        let history = vec![
            snapshot("sad", VadScore::new(0.2, 0.5, 0.5), 0),
            snapshot("neutral", VadScore::new(0.5, 0.5, 0.5), 10),
        ];
        let analysis = analyze_emotion_patterns(&history);
        assert!(analysis
            .trends
            .contains(&"Positive affect is gradually improving".to_string()));
        assert!(!analysis.recommendations.is_empty());
    }

    #[test]
    fn test_rising_arousal_trend() {
        let history = vec![
            snapshot("calm", VadScore::new(0.5, 0.3, 0.5), 0),
            snapshot("surprised", VadScore::new(0.5, 0.8, 0.5), 10),
        ];
        let analysis = analyze_emotion_patterns(&history);
        assert!(analysis
            .trends
            .contains(&"Emotional activation is increasing".to_string()));
    }

    #[test]
    fn test_frequent_emotions_above_thirty_percent() {
        let history = vec![
            snapshot("sad", VadScore::NEUTRAL, 0),
            snapshot("sad", VadScore::NEUTRAL, 10),
            snapshot("happy", VadScore::NEUTRAL, 20),
            snapshot("sad", VadScore::NEUTRAL, 30),
            snapshot("calm", VadScore::NEUTRAL, 40),
        ];
        let analysis = analyze_emotion_patterns(&history);
        // sad appears in 3/5 = 60% of entries; the others stay below 30%.
        assert_eq!(
            analysis.patterns,
            vec!["Frequently observed emotions: sad".to_string()]
        );
    }

    #[test]
    fn test_stable_history_has_no_trends() {
        let history = vec![
            snapshot("neutral", VadScore::NEUTRAL, 0),
            snapshot("neutral", VadScore::new(0.52, 0.48, 0.5), 10),
        ];
        let analysis = analyze_emotion_patterns(&history);
        assert!(analysis.trends.is_empty());
    }
}
