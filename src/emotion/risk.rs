// src/emotion/risk.rs
//
// Threshold ladder over the fused VAD score. Unlike emotion classification,
// every condition is evaluated and the most severe crossed tier wins, so a
// state that is both extremely negative and highly activated reports every
// signal it tripped.

use super::types::{RiskLevel, VadScore};

/// Risk assessment: tier plus the human-readable reasons and suggested actions.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    pub signals: Vec<String>,
    pub actions: Vec<String>,
}

/// Assess risk from a VAD score. Most severe crossed threshold selects the
/// tier; signals record every threshold crossed.
pub fn assess_risk(vad: &VadScore) -> RiskAssessment {
    let (v, a, d) = (vad.valence, vad.arousal, vad.dominance);

    let mut signals = Vec::new();
    let mut level = RiskLevel::Low;

    let mut raise = |signals: &mut Vec<String>, tier: RiskLevel, reason: &str| {
        signals.push(reason.to_string());
        if tier > level {
            level = tier;
        }
    };

    if v < 0.1 {
        raise(&mut signals, RiskLevel::High, "extremely low positivity");
    }
    if v < 0.2 && a > 0.8 {
        raise(
            &mut signals,
            RiskLevel::High,
            "severe negative state with high activation",
        );
    }
    if a > 0.9 {
        raise(&mut signals, RiskLevel::High, "extremely high emotional activation");
    }
    if d < 0.2 {
        raise(&mut signals, RiskLevel::High, "extremely low sense of control");
    }

    if v < 0.3 {
        raise(&mut signals, RiskLevel::Medium, "low positivity");
    }
    if a > 0.7 {
        raise(&mut signals, RiskLevel::Medium, "elevated emotional activation");
    }

    RiskAssessment {
        risk_level: level,
        actions: actions_for(level),
        signals,
    }
}

/// Fixed action list per tier.
pub fn actions_for(level: RiskLevel) -> Vec<String> {
    let actions: &[&str] = match level {
        RiskLevel::High => &[
            "Seek professional help right away",
            "Move to a safe environment",
            "Contact someone you trust",
        ],
        RiskLevel::Medium => &[
            "Try a deep breathing technique",
            "Keep emergency contacts at hand",
            "Consider scheduling a counseling session",
        ],
        RiskLevel::Low => &[
            "Keep monitoring your current state",
            "Practice a preventive coping technique",
        ],
    };
    actions.iter().map(|a| a.to_string()).collect()
}
