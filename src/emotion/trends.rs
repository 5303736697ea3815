// src/emotion/trends.rs
//
// Tracks how a session's affect moves between analyses. History arrives as
// the session's persisted snapshots (an externally-supplied, read-only
// list); this module owns no state of its own.

use serde::{Deserialize, Serialize};

use super::types::{EmotionSnapshot, FusedAnalysis};

/// Deltas smaller than this are treated as noise.
const TREND_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Worsening,
    Stable,
}

/// Change report between the current analysis and the most recent prior one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionTrend {
    pub trend: Trend,
    pub changes: Vec<String>,
    /// 0-100, centered at 50; driven by valence and dominance movement.
    pub progress: f64,
}

/// Compare the current analysis against the latest entry of the prior
/// history. An empty history reports a stable first analysis.
pub fn track_emotion_changes(current: &FusedAnalysis, previous: &[EmotionSnapshot]) -> EmotionTrend {
    let Some(last) = previous.last() else {
        return EmotionTrend {
            trend: Trend::Stable,
            changes: vec!["This is the first analysis for this session".to_string()],
            progress: 0.0,
        };
    };

    let dv = current.overall_vad.valence - last.vad_score.valence;
    let da = current.overall_vad.arousal - last.vad_score.arousal;
    let dd = current.overall_vad.dominance - last.vad_score.dominance;

    let mut trend = Trend::Stable;
    let mut changes = Vec::new();

    if dv > TREND_THRESHOLD {
        trend = Trend::Improving;
        changes.push("Positive affect has improved".to_string());
    } else if dv < -TREND_THRESHOLD {
        trend = Trend::Worsening;
        changes.push("Negative affect has increased".to_string());
    }

    if da > TREND_THRESHOLD {
        changes.push("Emotional activation has increased".to_string());
    } else if da < -TREND_THRESHOLD {
        changes.push("Emotional activation has decreased".to_string());
    }

    if dd > TREND_THRESHOLD {
        changes.push("Sense of control has improved".to_string());
    } else if dd < -TREND_THRESHOLD {
        changes.push("Sense of control has decreased".to_string());
    }

    let progress = ((dv + dd) * 50.0 + 50.0).clamp(0.0, 100.0);

    EmotionTrend { trend, changes, progress }
}
