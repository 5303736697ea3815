// tests/emotion_pipeline.rs
// Multimodal analysis pipeline tests
//
// Exercises the full fuse -> classify -> risk -> recommend path plus the
// CBT strategy stage with a stubbed generation collaborator. Critical
// aspects:
// 1. Neutral fallback when no channels are present
// 2. Fusion output stays in range for adversarial inputs
// 3. Classification/risk worked examples
// 4. Strategy elaboration falls back on unparsable responses
// 5. Elaboration replaces feedback sections wholesale on success

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use attune::cbt::{feedback, strategy};
use attune::emotion::types::{
    EmotionTag, FacialAnalysis, ModalityInput, RiskLevel, TextAnalysis, VadScore, VoiceAnalysis,
};
use attune::emotion::{ChannelWeights, FusionEngine};
use attune::llm::TextGenerator;

// ============================================================================
// TEST SETUP UTILITIES
// ============================================================================

fn engine() -> FusionEngine {
    FusionEngine::new(ChannelWeights::default()).expect("default weights are valid")
}

fn facial(vad: VadScore, confidence: f64, emotions: &[(&str, f64)]) -> FacialAnalysis {
    FacialAnalysis {
        vad_score: vad,
        confidence,
        landmarks: Vec::new(),
        emotions: emotions
            .iter()
            .map(|(label, score)| (label.to_string(), *score))
            .collect::<HashMap<_, _>>(),
    }
}

fn voice(vad: VadScore, confidence: f64) -> VoiceAnalysis {
    VoiceAnalysis {
        vad_score: vad,
        confidence,
        transcription: String::new(),
        audio_features: Default::default(),
    }
}

fn text(vad: VadScore, confidence: f64) -> TextAnalysis {
    TextAnalysis {
        vad_score: vad,
        confidence,
        keywords: Vec::new(),
        primary_emotion: None,
        intensity: None,
    }
}

/// Generator stub with a scripted response.
struct ScriptedGenerator {
    response: String,
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Ok(self.response.clone())
    }
}

/// Generator stub that always fails.
struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        anyhow::bail!("network unreachable")
    }
}

// ============================================================================
// FUSION & CLASSIFICATION
// ============================================================================

#[test]
fn empty_input_yields_neutral_low_risk() {
    let analysis = engine().integrate_analysis(ModalityInput::default());

    assert_eq!(analysis.overall_vad, VadScore::NEUTRAL);
    assert_eq!(analysis.confidence, 0.5);
    assert_eq!(analysis.primary_emotion, EmotionTag::Neutral);
    assert_eq!(analysis.risk_level, RiskLevel::Low);
}

#[test]
fn agreeing_channels_reinforce_the_emotion() {
    let distressed = VadScore::new(0.15, 0.85, 0.3);
    let input = ModalityInput {
        facial: Some(facial(distressed, 0.9, &[("angry", 0.7)])),
        voice: Some(voice(distressed, 0.8)),
        text: Some(text(distressed, 0.7)),
    };

    let analysis = engine().integrate_analysis(input);
    assert_eq!(analysis.primary_emotion, EmotionTag::Angry);
    assert_eq!(analysis.risk_level, RiskLevel::High);
    assert!(analysis.secondary_emotions.contains(&"negative".to_string()));
    assert!(!analysis.recommendations.is_empty());
    assert!(analysis.recommendations.len() <= 5);
}

#[test]
fn disagreeing_channels_weigh_by_confidence() {
    // A confident facial reading should pull the result toward its side.
    let input = ModalityInput {
        facial: Some(facial(VadScore::new(0.9, 0.5, 0.5), 0.95, &[])),
        voice: None,
        text: Some(text(VadScore::new(0.1, 0.5, 0.5), 0.2)),
    };

    let analysis = engine().integrate_analysis(input);
    assert!(analysis.overall_vad.valence > 0.7);
    assert_eq!(analysis.primary_emotion, EmotionTag::Happy);
}

#[test]
fn adversarial_inputs_stay_in_range() {
    let input = ModalityInput {
        facial: Some(facial(VadScore::new(99.0, -5.0, f64::NAN), 7.0, &[])),
        voice: Some(voice(VadScore::new(f64::INFINITY, 0.5, -1.0), f64::NAN)),
        text: Some(text(VadScore::new(-0.01, 1.01, 0.5), 0.0)),
    };

    let analysis = engine().integrate_analysis(input);
    for dim in [
        analysis.overall_vad.valence,
        analysis.overall_vad.arousal,
        analysis.overall_vad.dominance,
    ] {
        assert!(dim.is_finite());
        assert!((0.0..=1.0).contains(&dim));
    }
    assert!((0.0..=1.0).contains(&analysis.confidence));
}

// ============================================================================
// CBT STRATEGY ELABORATION
// ============================================================================

#[tokio::test]
async fn unparsable_elaboration_keeps_deterministic_strategy() {
    let vad = VadScore::new(0.2, 0.8, 0.4);
    let base = strategy::map_strategy("angry", &vad);
    let expected_technique = base.cognitive_techniques.technique.clone();

    let generator = ScriptedGenerator {
        response: "I'd rather chat about the weather.".to_string(),
    };
    let result =
        strategy::elaborate_strategy(&generator, base, &vad, "argument at work", &[]).await;

    assert_eq!(result.cognitive_techniques.technique, expected_technique);
    assert!(result
        .priority_techniques
        .contains(&"Progressive muscle relaxation".to_string()));
}

#[tokio::test]
async fn failed_elaboration_call_keeps_deterministic_strategy() {
    let vad = VadScore::new(0.5, 0.5, 0.5);
    let base = strategy::map_strategy("neutral", &vad);
    let focus = base.focus.clone();

    let result = strategy::elaborate_strategy(&FailingGenerator, base, &vad, "", &[]).await;
    assert_eq!(result.focus, focus);
}

#[tokio::test]
async fn successful_elaboration_replaces_feedback_sections() {
    let vad = VadScore::new(0.2, 0.5, 0.5);

    let mut elaborated = feedback::deterministic_feedback(&vad);
    elaborated.cognitive_techniques.technique = "Socratic questioning".to_string();
    let generator = ScriptedGenerator {
        response: format!(
            "Here you go:\n{}",
            serde_json::to_string(&elaborated).unwrap()
        ),
    };

    let base = strategy::map_strategy("sad", &vad);
    let result = strategy::elaborate_strategy(&generator, base, &vad, "", &[]).await;

    // Feedback sections come from the elaboration; the deterministic focus
    // and priority list are untouched.
    assert_eq!(result.cognitive_techniques.technique, "Socratic questioning");
    assert_eq!(result.focus, "Mood lifting - positive reframing");
}

#[tokio::test]
async fn generate_cbt_feedback_falls_back_on_failure() {
    let vad = VadScore::new(0.2, 0.9, 0.4);
    let result = feedback::generate_cbt_feedback(&FailingGenerator, &vad, "exam stress", &[]).await;

    // High arousal selects the calming technique in the deterministic path.
    assert_eq!(result.cognitive_techniques.technique, "Calming and grounding");
}

// ============================================================================
// GENERATOR STUB SANITY
// ============================================================================

#[tokio::test]
async fn scripted_generator_round_trips() {
    let generator: Arc<dyn TextGenerator> = Arc::new(ScriptedGenerator {
        response: "{\"content\": \"hi\"}".to_string(),
    });
    let response = generator.generate("prompt").await.unwrap();
    assert!(response.contains("content"));
}
