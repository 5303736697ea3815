//! Multimodal affect analysis
//!
//! Fuses up to three independent signal channels (facial expression, voice
//! tone, free text) into a single VAD estimate, then classifies it into
//! discrete emotion and risk labels. Everything here is pure and synchronous:
//! each call takes a full snapshot of its inputs and returns a new value, so
//! concurrent sessions need no coordination.
//!
//! Upstream detectors (landmark extraction, speech transcription) are out of
//! scope; this module starts from their typed outputs.

pub mod classify;
pub mod fusion;
pub mod normalize;
pub mod risk;
pub mod signals;
pub mod text;
pub mod trends;
pub mod types;

use tracing::debug;

pub use fusion::{ChannelWeights, FusedVad, FusionEngine};
pub use types::{
    AudioFeatures, EmotionSnapshot, EmotionTag, FacialAnalysis, FusedAnalysis, Intensity,
    ModalityInput, RiskLevel, TextAnalysis, VadScore, VoiceAnalysis,
};

/// Maximum number of recommendations attached to a fused analysis.
const MAX_RECOMMENDATIONS: usize = 5;

impl FusionEngine {
    /// Full integration pass: fuse the present channels, classify the result,
    /// assess risk, and attach recommendations. Absent channels and even a
    /// fully empty input are handled by defaulting, never by failing.
    pub fn integrate_analysis(&self, input: ModalityInput) -> FusedAnalysis {
        let fused = self.fuse(&input);

        let primary_emotion = classify::classify_emotion(&fused.vad);
        let secondary_emotions = classify::secondary_emotions(&fused.vad, &input);
        let assessment = risk::assess_risk(&fused.vad);
        let recommendations = recommendations(&fused.vad, assessment.risk_level, &input);

        debug!(
            emotion = %primary_emotion,
            risk = assessment.risk_level.as_str(),
            channels = input.present_count(),
            "integrated multimodal analysis"
        );

        FusedAnalysis {
            overall_vad: fused.vad,
            confidence: fused.confidence,
            primary_emotion,
            secondary_emotions,
            analysis: input,
            recommendations,
            risk_level: assessment.risk_level,
        }
    }
}

/// Tier-based recommendations first, then VAD-tuned ones, then hints for the
/// channels that were actually observed. Capped at five.
fn recommendations(vad: &VadScore, level: RiskLevel, input: &ModalityInput) -> Vec<String> {
    let mut recs: Vec<String> = Vec::new();

    match level {
        RiskLevel::High => {
            recs.push("Seeking professional support is recommended".into());
            recs.push("Move to a safe environment right away".into());
        }
        RiskLevel::Medium => {
            recs.push("Try a slow breathing technique".into());
            recs.push("Talk with someone you trust".into());
        }
        RiskLevel::Low => {}
    }

    if vad.valence < 0.4 {
        recs.push("Practice shifting toward a more positive framing".into());
    }
    if vad.arousal > 0.7 {
        recs.push("Try a calming exercise such as 4-7-8 breathing".into());
    }
    if vad.dominance < 0.3 {
        recs.push("Start with a small activity that builds a sense of control".into());
    }

    if input.facial.is_some() {
        recs.push("Keep monitoring your emotional state through facial expression".into());
    }
    if input.voice.is_some() {
        recs.push("Notice how your tone of voice shifts with your emotions".into());
    }

    recs.truncate(MAX_RECOMMENDATIONS);
    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn engine() -> FusionEngine {
        FusionEngine::new(ChannelWeights::default()).unwrap()
    }

    #[test]
    fn test_empty_input_integrates_to_neutral() {
        let analysis = engine().integrate_analysis(ModalityInput::default());
        assert_eq!(analysis.overall_vad, VadScore::NEUTRAL);
        assert_eq!(analysis.confidence, 0.5);
        assert_eq!(analysis.primary_emotion, EmotionTag::Neutral);
        assert_eq!(analysis.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_recommendations_capped_at_five() {
        // Distressed state with both observable channels present would
        // otherwise produce seven recommendations.
        let input = ModalityInput {
            facial: Some(FacialAnalysis {
                vad_score: VadScore::new(0.05, 0.95, 0.1),
                confidence: 0.9,
                landmarks: Vec::new(),
                emotions: HashMap::new(),
            }),
            voice: Some(VoiceAnalysis {
                vad_score: VadScore::new(0.1, 0.9, 0.1),
                confidence: 0.8,
                transcription: String::new(),
                audio_features: Default::default(),
            }),
            text: None,
        };
        let analysis = engine().integrate_analysis(input);
        assert_eq!(analysis.risk_level, RiskLevel::High);
        assert_eq!(analysis.recommendations.len(), 5);
    }

    #[test]
    fn test_modality_hints_only_for_present_channels() {
        let input = ModalityInput {
            facial: None,
            voice: None,
            text: Some(TextAnalysis {
                vad_score: VadScore::new(0.6, 0.4, 0.5),
                confidence: 0.7,
                keywords: Vec::new(),
                primary_emotion: None,
                intensity: None,
            }),
        };
        let analysis = engine().integrate_analysis(input);
        assert!(analysis
            .recommendations
            .iter()
            .all(|r| !r.contains("facial") && !r.contains("voice")));
    }
}
