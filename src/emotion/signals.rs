// src/emotion/signals.rs
//
// Pure VAD derivations over detector output that arrives without a VAD
// estimate of its own: a facial emotion-score map, or a voice transcription
// plus acoustic features. How those detections are produced (landmarks,
// transcription) is out of scope.

use std::collections::HashMap;

use super::normalize::normalize_vad;
use super::text;
use super::types::{AudioFeatures, VadScore};

/// Derive a VAD score from a facial emotion-score map. Each dimension is the
/// neutral point shifted by the difference between two opposing label groups.
pub fn vad_from_facial_emotions(emotions: &HashMap<String, f64>) -> VadScore {
    if emotions.is_empty() {
        return VadScore::NEUTRAL;
    }

    let positive = group_mean(emotions, &["happy", "joy", "excited", "content"]);
    let negative = group_mean(emotions, &["sad", "angry", "fear", "disgust"]);
    let valence = 0.5 + (positive - negative) * 0.5;

    let high_arousal = group_mean(emotions, &["excited", "angry", "fear", "surprised"]);
    let low_arousal = group_mean(emotions, &["sad", "content", "calm"]);
    let arousal = 0.5 + (high_arousal - low_arousal) * 0.5;

    let dominant = group_mean(emotions, &["angry", "confident", "excited"]);
    let submissive = group_mean(emotions, &["fear", "sad", "anxious"]);
    let dominance = 0.5 + (dominant - submissive) * 0.5;

    normalize_vad(VadScore::new(valence, arousal, dominance))
}

fn group_mean(emotions: &HashMap<String, f64>, labels: &[&str]) -> f64 {
    let sum: f64 = labels
        .iter()
        .map(|label| emotions.get(*label).copied().unwrap_or(0.0))
        .sum();
    sum / labels.len() as f64
}

/// Derive a VAD score from a voice transcription, then adjust it with the
/// acoustic features: pitch shifts valence, tempo shifts arousal, volume
/// shifts dominance, each relative to the 0.5 midpoint.
pub fn vad_from_voice(transcription: &str, features: &AudioFeatures) -> VadScore {
    let base = text::analyze_text(transcription).vad_score;

    normalize_vad(VadScore::new(
        base.valence + (features.pitch - 0.5) * 0.2,
        base.arousal + (features.tempo - 0.5) * 0.3,
        base.dominance + (features.volume - 0.5) * 0.2,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_emotion_map_is_neutral() {
        assert_eq!(vad_from_facial_emotions(&HashMap::new()), VadScore::NEUTRAL);
    }

    #[test]
    fn test_happy_face_raises_valence() {
        let mut emotions = HashMap::new();
        emotions.insert("happy".to_string(), 0.9);
        emotions.insert("joy".to_string(), 0.6);

        let vad = vad_from_facial_emotions(&emotions);
        assert!(vad.valence > 0.5);
    }

    #[test]
    fn test_fearful_face_lowers_dominance() {
        let mut emotions = HashMap::new();
        emotions.insert("fear".to_string(), 0.8);
        emotions.insert("sad".to_string(), 0.5);

        let vad = vad_from_facial_emotions(&emotions);
        assert!(vad.valence < 0.5);
        assert!(vad.dominance < 0.5);
    }

    #[test]
    fn test_voice_features_shift_neutral_transcription() {
        let features = AudioFeatures {
            pitch: 1.0,
            tempo: 1.0,
            volume: 0.0,
            clarity: 0.8,
        };
        let vad = vad_from_voice("see you at the station", &features);
        assert!((vad.valence - 0.6).abs() < 1e-9);
        assert!((vad.arousal - 0.65).abs() < 1e-9);
        assert!((vad.dominance - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_voice_output_in_range() {
        let features = AudioFeatures {
            pitch: 1.0,
            tempo: 1.0,
            volume: 1.0,
            clarity: 1.0,
        };
        let vad = vad_from_voice("I am really excited and thrilled", &features);
        for dim in [vad.valence, vad.arousal, vad.dominance] {
            assert!((0.0..=1.0).contains(&dim));
        }
    }
}
