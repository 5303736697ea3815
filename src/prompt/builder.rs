// src/prompt/builder.rs
//
// Assembles the prompts sent to the generation collaborator. The rendered
// conversation block from the context manager is inserted verbatim; these
// builders only add the framing around it.

use crate::emotion::types::FusedAnalysis;

/// Base system prompt for counseling turns.
pub const CBT_SYSTEM_PROMPT: &str = r#"You are a professional CBT (cognitive behavioral therapy) counselor. Follow these principles:

1. **Empathic understanding**: understand the user's feelings and situation deeply and show empathy
2. **Cognitive restructuring**: notice negative thought patterns and offer more constructive perspectives
3. **Behavior change**: suggest concrete, achievable behavioral strategies
4. **Gradual approach**: do not rush to solutions; move step by step
5. **Self-efficacy**: help the user trust their own abilities

Counseling style:
- Keep a warm, supportive tone
- Use professional yet approachable language
- Offer concrete examples and practice exercises
- Check in on the user's progress regularly"#;

/// Build a full counseling prompt: system framing, the rendered conversation
/// block, the current message plus any emotion context, and the response
/// format the caller parses.
pub fn build_chat_prompt(
    message: &str,
    conversation_block: &str,
    emotion_context: Option<&FusedAnalysis>,
) -> String {
    let mut prompt = String::from(CBT_SYSTEM_PROMPT);

    if !conversation_block.is_empty() {
        prompt.push_str(conversation_block);
    }

    prompt.push_str(&format!("\nCurrent user message: {message}\n"));

    if let Some(analysis) = emotion_context {
        prompt.push_str(&format!(
            "\nEmotion context:\n- Current emotional state: {}\n- Analysis confidence: {:.2}\n",
            analysis.primary_emotion, analysis.confidence
        ));
        if !analysis.secondary_emotions.is_empty() {
            prompt.push_str(&format!(
                "- Secondary descriptors: {}\n",
                analysis.secondary_emotions.join(", ")
            ));
        }
    }

    prompt.push_str(RESPONSE_FORMAT);
    prompt
}

const RESPONSE_FORMAT: &str = r#"
Respond with a single JSON object in this shape:

{
  "content": "your counseling response, continuous with the earlier conversation",
  "emotionAnalysis": {
    "primaryEmotion": "the main emotion you detect",
    "confidence": 0.95,
    "suggestions": ["CBT technique suggestions tied to what was said"]
  }
}

When responding:
1. Refer back to the earlier conversation so the reply stays continuous
2. Track how the user's feelings and situation are developing
3. Connect your advice to things mentioned before
4. Keep a natural, empathic tone
5. Make the suggestions concrete and achievable"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::types::{EmotionTag, FusedAnalysis, ModalityInput, RiskLevel, VadScore};

    #[test]
    fn test_chat_prompt_includes_context_block() {
        let prompt = build_chat_prompt("I feel stuck", "\n\nPrevious conversation:\n[User]: hi\n", None);
        assert!(prompt.contains("Previous conversation"));
        assert!(prompt.contains("Current user message: I feel stuck"));
        assert!(prompt.contains("\"content\""));
    }

    #[test]
    fn test_chat_prompt_without_context() {
        let prompt = build_chat_prompt("hello", "", None);
        assert!(!prompt.contains("Previous conversation"));
        assert!(prompt.starts_with(CBT_SYSTEM_PROMPT));
    }

    #[test]
    fn test_chat_prompt_with_emotion_context() {
        let analysis = FusedAnalysis {
            overall_vad: VadScore::new(0.2, 0.8, 0.4),
            confidence: 0.85,
            primary_emotion: EmotionTag::Angry,
            secondary_emotions: vec!["negative".into(), "activated".into()],
            analysis: ModalityInput::default(),
            recommendations: Vec::new(),
            risk_level: RiskLevel::Medium,
        };
        let prompt = build_chat_prompt("why does this keep happening", "", Some(&analysis));
        assert!(prompt.contains("Current emotional state: angry"));
        assert!(prompt.contains("negative, activated"));
    }
}
