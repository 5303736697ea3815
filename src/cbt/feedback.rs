// src/cbt/feedback.rs
//
// Structured CBT feedback. The deterministic builder is keyed on VAD alone
// and always succeeds; the generated path asks the collaborator for an
// elaborated version and falls back on any parse failure, so callers never
// see an error from this module.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::emotion::types::{EmotionSnapshot, VadScore};
use crate::llm::{extract_json_object, TextGenerator};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionAssessment {
    pub current_state: String,
    pub triggers: Vec<String>,
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CognitiveTechniques {
    pub technique: String,
    pub description: String,
    pub exercises: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehavioralStrategies {
    pub strategy: String,
    pub steps: Vec<String>,
    pub expected_outcome: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressTracking {
    pub metrics: Vec<String>,
    pub goals: Vec<String>,
    pub timeline: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CbtFeedback {
    pub emotion_assessment: EmotionAssessment,
    pub cognitive_techniques: CognitiveTechniques,
    pub behavioral_strategies: BehavioralStrategies,
    pub progress_tracking: ProgressTracking,
}

/// Generate CBT feedback: one elaboration attempt, deterministic fallback.
pub async fn generate_cbt_feedback(
    generator: &dyn TextGenerator,
    vad: &VadScore,
    context: &str,
    history: &[EmotionSnapshot],
) -> CbtFeedback {
    let prompt = build_feedback_prompt(vad, context, history);

    match generator.generate(&prompt).await {
        Ok(response) => match parse_feedback(&response) {
            Ok(feedback) => feedback,
            Err(e) => {
                warn!("discarding unparsable CBT elaboration: {e}");
                deterministic_feedback(vad)
            }
        },
        Err(e) => {
            warn!("CBT elaboration call failed: {e}");
            deterministic_feedback(vad)
        }
    }
}

/// Prompt for the elaboration call: VAD values, free-text context, and the
/// last five history entries.
pub fn build_feedback_prompt(vad: &VadScore, context: &str, history: &[EmotionSnapshot]) -> String {
    let history_block = if history.is_empty() {
        "No previous records.".to_string()
    } else {
        history
            .iter()
            .rev()
            .take(5)
            .rev()
            .map(|h| {
                format!(
                    "- {}: {} (V:{:.2}, A:{:.2}, D:{:.2})",
                    h.timestamp.format("%Y-%m-%d %H:%M"),
                    h.primary_emotion,
                    h.vad_score.valence,
                    h.vad_score.arousal,
                    h.vad_score.dominance,
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"You are a professional CBT (cognitive behavioral therapy) counselor. Provide personalized CBT feedback based on the following information.

**Current emotional state (VAD analysis):**
- Valence (positivity): {valence:.2} (0-1, higher is more positive)
- Arousal (activation): {arousal:.2} (0-1, higher is more activated)
- Dominance (control): {dominance:.2} (0-1, higher is more in control)

**Situational context:**
{context}

**Emotion history:**
{history_block}

Respond with a single JSON object in this exact shape:

{{
  "emotionAssessment": {{
    "currentState": "professional assessment of the current emotional state",
    "triggers": ["factors that triggered the emotion"],
    "patterns": ["recurring thought or behavior patterns"]
  }},
  "cognitiveTechniques": {{
    "technique": "the most suitable CBT technique",
    "description": "detailed description of the technique",
    "exercises": ["concrete practice exercises"]
  }},
  "behavioralStrategies": {{
    "strategy": "behavior change strategy",
    "steps": ["step-by-step actions"],
    "expectedOutcome": "expected result"
  }},
  "progressTracking": {{
    "metrics": ["indicators to track"],
    "goals": ["short-term and long-term goals"],
    "timeline": "expected time to reach the goals"
  }}
}}

Keep the advice concrete, achievable, and supportive in tone."#,
        valence = vad.valence,
        arousal = vad.arousal,
        dominance = vad.dominance,
    )
}

/// Parse an elaboration response. Accepts a raw string containing one JSON
/// object, or a `{"content": "..."}` wrapper whose content contains one.
/// Anything else is a parse failure and the caller discards the attempt.
pub fn parse_feedback(response: &str) -> Result<CbtFeedback, crate::llm::LlmError> {
    let value = extract_json_object(response)?;

    if let Ok(feedback) = serde_json::from_value::<CbtFeedback>(value.clone()) {
        return Ok(feedback);
    }

    // Structured wrapper: the actual payload rides inside `content`.
    if let Some(content) = value.get("content").and_then(|c| c.as_str()) {
        let inner = extract_json_object(content)?;
        return Ok(serde_json::from_value(inner)?);
    }

    Err(crate::llm::LlmError::UnexpectedShape)
}

/// Deterministic feedback keyed on the VAD score alone. The arousal check
/// runs last so a highly activated state overrides the valence-derived
/// technique choice.
pub fn deterministic_feedback(vad: &VadScore) -> CbtFeedback {
    let mut current_state = "You appear to be in a neutral emotional state.".to_string();
    let mut technique = "Mindfulness meditation";
    let mut strategy = "Everyday stress management";

    if vad.valence < 0.3 {
        current_state = "A negative emotional state appears to be persisting.".to_string();
        technique = "Cognitive restructuring";
        strategy = "Shifting toward positive framing";
    } else if vad.valence > 0.7 {
        current_state = "You are maintaining a positive emotional state.".to_string();
        technique = "Gratitude practice";
        strategy = "Building on positive experiences";
    }

    if vad.arousal > 0.7 {
        current_state.push_str(" High emotional activation is also present.");
        technique = "Calming and grounding";
        strategy = "Relaxation training";
    }

    CbtFeedback {
        emotion_assessment: EmotionAssessment {
            current_state,
            triggers: vec![
                "Everyday stress".into(),
                "Interpersonal relationships".into(),
                "Work pressure".into(),
            ],
            patterns: vec![
                "Perfectionistic thinking".into(),
                "Negative prediction".into(),
                "Excessive worry".into(),
            ],
        },
        cognitive_techniques: CognitiveTechniques {
            technique: technique.to_string(),
            description: "A CBT technique suited to the current emotional state.".to_string(),
            exercises: vec![
                "Breathing meditation".into(),
                "Thought records".into(),
                "Emotion labeling".into(),
            ],
        },
        behavioral_strategies: BehavioralStrategies {
            strategy: strategy.to_string(),
            steps: vec![
                "Set a small goal".into(),
                "Practice daily".into(),
                "Record the outcome".into(),
            ],
            expected_outcome: "Improved emotion regulation and overall wellbeing".to_string(),
        },
        progress_tracking: ProgressTracking {
            metrics: vec![
                "Daily mood score".into(),
                "Stress level".into(),
                "Goal completion rate".into(),
            ],
            goals: vec![
                "Short term: learn an emotion regulation technique".into(),
                "Long term: maintain stable mental health".into(),
            ],
            timeline: "6-12 weeks".to_string(),
        },
    }
}
