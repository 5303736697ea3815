// src/emotion/normalize.rs

use super::types::VadScore;

/// Confidence floor for a present modality; a present-but-uncertain channel
/// is never fully discounted.
pub const MIN_CONFIDENCE: f64 = 0.1;

/// Clamp a single VAD dimension into [0,1]. Upstream detectors occasionally
/// emit slightly out-of-range or non-finite values; both are repaired
/// silently rather than rejected.
pub fn clamp_dimension(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.5;
    }
    value.clamp(0.0, 1.0)
}

/// Normalize a modality's VAD payload so every field is in range and never NaN.
pub fn normalize_vad(vad: VadScore) -> VadScore {
    VadScore {
        valence: clamp_dimension(vad.valence),
        arousal: clamp_dimension(vad.arousal),
        dominance: clamp_dimension(vad.dominance),
    }
}

/// Normalize a modality confidence into [MIN_CONFIDENCE, 1.0].
pub fn normalize_confidence(confidence: f64) -> f64 {
    if !confidence.is_finite() {
        return MIN_CONFIDENCE;
    }
    confidence.clamp(MIN_CONFIDENCE, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_out_of_range_vad() {
        let vad = normalize_vad(VadScore::new(1.3, -0.2, 0.5));
        assert_eq!(vad.valence, 1.0);
        assert_eq!(vad.arousal, 0.0);
        assert_eq!(vad.dominance, 0.5);
    }

    #[test]
    fn test_non_finite_becomes_neutral() {
        let vad = normalize_vad(VadScore::new(f64::NAN, f64::INFINITY, 0.2));
        assert_eq!(vad.valence, 0.5);
        assert_eq!(vad.arousal, 1.0);
        assert_eq!(vad.dominance, 0.2);
    }

    #[test]
    fn test_confidence_floor() {
        assert_eq!(normalize_confidence(0.0), MIN_CONFIDENCE);
        assert_eq!(normalize_confidence(0.05), MIN_CONFIDENCE);
        assert_eq!(normalize_confidence(1.7), 1.0);
        assert_eq!(normalize_confidence(f64::NAN), MIN_CONFIDENCE);
        assert_eq!(normalize_confidence(0.8), 0.8);
    }
}
