// src/cbt/strategy.rs
//
// Emotion label → base therapeutic strategy, plus VAD-driven adjustments.
// The table is immutable and initialized once; lookups never fail because
// unknown labels degrade to the neutral entry.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use super::feedback::{
    self, BehavioralStrategies, CbtFeedback, CognitiveTechniques, EmotionAssessment,
    ProgressTracking,
};
use crate::emotion::types::{EmotionSnapshot, VadScore};
use crate::llm::TextGenerator;

/// Structured therapeutic strategy for one analyzed state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CbtStrategy {
    pub focus: String,
    pub priority_techniques: Vec<String>,
    pub emotion_assessment: EmotionAssessment,
    pub cognitive_techniques: CognitiveTechniques,
    pub behavioral_strategies: BehavioralStrategies,
    pub progress_tracking: ProgressTracking,
}

struct StrategyTemplate {
    name: &'static str,
    techniques: &'static [&'static str],
    exercises: &'static [&'static str],
    resources: &'static [&'static str],
}

static STRATEGY_TABLE: Lazy<HashMap<&'static str, StrategyTemplate>> = Lazy::new(|| {
    let mut table = HashMap::new();

    table.insert(
        "angry",
        StrategyTemplate {
            name: "Anger management",
            techniques: &["Cognitive restructuring", "Time-out technique"],
            exercises: &[
                "Count slowly to ten before responding",
                "Write down the thought that sparked the anger",
                "Check the evidence for and against that thought",
            ],
            resources: &["Anger diary template", "Guided muscle relaxation audio"],
        },
    );
    table.insert(
        "sad",
        StrategyTemplate {
            name: "Mood lifting",
            techniques: &["Behavioral activation", "Thought records"],
            exercises: &[
                "Schedule one small pleasant activity for today",
                "Record three things that went reasonably well",
            ],
            resources: &["Pleasant activity list", "Daily mood log"],
        },
    );
    table.insert(
        "anxious",
        StrategyTemplate {
            name: "Anxiety reduction",
            techniques: &["Worry scheduling", "Grounding"],
            exercises: &[
                "Practice 5-4-3-2-1 sensory grounding",
                "Confine worrying to one fixed daily window",
            ],
            resources: &["Grounding exercise card", "Worry log template"],
        },
    );
    table.insert(
        "happy",
        StrategyTemplate {
            name: "Positive consolidation",
            techniques: &["Gratitude practice", "Savoring"],
            exercises: &[
                "Write down what made this moment good",
                "Share the experience with someone close",
            ],
            resources: &["Gratitude journal"],
        },
    );
    table.insert(
        "excited",
        StrategyTemplate {
            name: "Energy channeling",
            techniques: &["Goal setting", "Mindful pacing"],
            exercises: &[
                "Pick one concrete goal for the energy",
                "Plan a recovery pause after the peak",
            ],
            resources: &["Goal planning worksheet"],
        },
    );
    table.insert(
        "surprised",
        StrategyTemplate {
            name: "Orientation support",
            techniques: &["Naming the emotion", "Reality testing"],
            exercises: &[
                "Describe what just changed in one sentence",
                "Separate facts from first interpretations",
            ],
            resources: &["Emotion naming wheel"],
        },
    );
    table.insert(
        "calm",
        StrategyTemplate {
            name: "Maintenance",
            techniques: &["Mindfulness practice", "Value-based planning"],
            exercises: &[
                "Ten minutes of breathing meditation",
                "Review which activities support this state",
            ],
            resources: &["Mindfulness starter guide"],
        },
    );
    table.insert(
        "neutral",
        StrategyTemplate {
            name: "Self-observation",
            techniques: &["Mindfulness meditation", "Emotion labeling"],
            exercises: &[
                "Note your emotional state three times today",
                "Label each observation without judging it",
            ],
            resources: &["Emotion check-in worksheet"],
        },
    );

    table
});

struct Adjustment {
    technique: &'static str,
    focus: &'static str,
}

/// VAD-driven adjustments; a state can trigger more than one.
fn vad_adjustments(vad: &VadScore) -> Vec<Adjustment> {
    let mut adjustments = Vec::new();

    if vad.arousal > 0.7 {
        adjustments.push(Adjustment {
            technique: "Progressive muscle relaxation",
            focus: "calming and de-escalation",
        });
    }
    if vad.arousal < 0.3 {
        adjustments.push(Adjustment {
            technique: "Behavioral activation",
            focus: "activation and motivation",
        });
    }
    if vad.valence < 0.3 {
        adjustments.push(Adjustment {
            technique: "Positive reframing",
            focus: "positive reframing",
        });
    }
    if vad.dominance > 0.7 {
        adjustments.push(Adjustment {
            technique: "Collaborative goal setting",
            focus: "collaborative and empathic approach",
        });
    }

    adjustments
}

/// Map an emotion label plus VAD score onto a strategy. Purely deterministic;
/// unknown labels fall back to the neutral template.
pub fn map_strategy(emotion: &str, vad: &VadScore) -> CbtStrategy {
    let label = emotion.to_lowercase();
    let template = STRATEGY_TABLE
        .get(label.as_str())
        .unwrap_or_else(|| &STRATEGY_TABLE["neutral"]);

    let mut focus = template.name.to_string();
    let mut priority_techniques: Vec<String> =
        template.techniques.iter().map(|t| t.to_string()).collect();

    for adjustment in vad_adjustments(vad) {
        priority_techniques.push(adjustment.technique.to_string());
        focus = format!("{} - {}", template.name, adjustment.focus);
    }

    let base_feedback = feedback::deterministic_feedback(vad);

    CbtStrategy {
        focus,
        priority_techniques,
        emotion_assessment: base_feedback.emotion_assessment,
        cognitive_techniques: CognitiveTechniques {
            technique: template.techniques[0].to_string(),
            description: format!(
                "{} centered on {}. Suggested materials: {}.",
                template.techniques[0],
                template.name.to_lowercase(),
                template.resources.join(", "),
            ),
            exercises: template.exercises.iter().map(|e| e.to_string()).collect(),
        },
        behavioral_strategies: base_feedback.behavioral_strategies,
        progress_tracking: base_feedback.progress_tracking,
    }
}

/// Optional enrichment stage: ask the collaborator to elaborate the strategy
/// narrative. On success the feedback sections are replaced wholesale; on any
/// failure the deterministic strategy is returned untouched.
pub async fn elaborate_strategy(
    generator: &dyn TextGenerator,
    mut strategy: CbtStrategy,
    vad: &VadScore,
    context: &str,
    history: &[EmotionSnapshot],
) -> CbtStrategy {
    let prompt = feedback::build_feedback_prompt(vad, context, history);

    let elaborated: Option<CbtFeedback> = match generator.generate(&prompt).await {
        Ok(response) => match feedback::parse_feedback(&response) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("discarding unparsable strategy elaboration: {e}");
                None
            }
        },
        Err(e) => {
            warn!("strategy elaboration call failed: {e}");
            None
        }
    };

    if let Some(parsed) = elaborated {
        strategy.emotion_assessment = parsed.emotion_assessment;
        strategy.cognitive_techniques = parsed.cognitive_techniques;
        strategy.behavioral_strategies = parsed.behavioral_strategies;
        strategy.progress_tracking = parsed.progress_tracking;
    }

    strategy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_lookup_per_emotion() {
        let strategy = map_strategy("angry", &VadScore::new(0.5, 0.5, 0.5));
        assert_eq!(strategy.focus, "Anger management");
        assert_eq!(strategy.priority_techniques[0], "Cognitive restructuring");
    }

    #[test]
    fn test_unknown_label_falls_back_to_neutral() {
        let strategy = map_strategy("bewildered", &VadScore::new(0.5, 0.5, 0.5));
        assert_eq!(strategy.focus, "Self-observation");
    }

    #[test]
    fn test_high_arousal_adds_relaxation_for_any_emotion() {
        let vad = VadScore::new(0.5, 0.8, 0.5);
        for emotion in ["angry", "sad", "anxious", "happy", "excited", "surprised", "calm", "neutral"] {
            let strategy = map_strategy(emotion, &vad);
            assert!(
                strategy
                    .priority_techniques
                    .contains(&"Progressive muscle relaxation".to_string()),
                "{emotion} missing relaxation technique"
            );
            assert!(strategy.focus.ends_with("calming and de-escalation"));
        }
    }

    #[test]
    fn test_adjustments_are_cumulative() {
        // Low valence + high arousal + high dominance: three adjustments.
        let strategy = map_strategy("sad", &VadScore::new(0.2, 0.8, 0.8));
        assert!(strategy.priority_techniques.contains(&"Progressive muscle relaxation".to_string()));
        assert!(strategy.priority_techniques.contains(&"Positive reframing".to_string()));
        assert!(strategy.priority_techniques.contains(&"Collaborative goal setting".to_string()));
        // Focus keeps the base name with the last adjustment's focus.
        assert!(strategy.focus.starts_with("Mood lifting - "));
    }

    #[test]
    fn test_low_arousal_adds_activation() {
        let strategy = map_strategy("sad", &VadScore::new(0.5, 0.2, 0.5));
        assert!(strategy.priority_techniques.contains(&"Behavioral activation".to_string()));
        assert!(strategy.focus.ends_with("activation and motivation"));
    }

    #[test]
    fn test_no_adjustment_keeps_base_focus() {
        let strategy = map_strategy("calm", &VadScore::new(0.6, 0.5, 0.5));
        assert_eq!(strategy.focus, "Maintenance");
        assert_eq!(strategy.priority_techniques.len(), 2);
    }
}
