// src/emotion/fusion.rs
//
// Confidence-weighted fusion of per-channel VAD estimates into one score.
// Facial expression is weighted highest (most diagnostic of felt emotion),
// free text lowest (most open to conscious control).

use anyhow::{bail, Result};

use super::normalize::{normalize_confidence, normalize_vad};
use super::types::{ModalityInput, VadScore};
use crate::config::AttuneConfig;

/// Base channel weights before confidence scaling.
pub const BASE_WEIGHT_FACIAL: f64 = 0.40;
pub const BASE_WEIGHT_VOICE: f64 = 0.35;
pub const BASE_WEIGHT_TEXT: f64 = 0.25;

/// Number of modality channels the engine can fuse.
const CHANNEL_COUNT: usize = 3;

/// Per-channel base weight table, validated once at startup.
#[derive(Debug, Clone, Copy)]
pub struct ChannelWeights {
    pub facial: f64,
    pub voice: f64,
    pub text: f64,
}

impl Default for ChannelWeights {
    fn default() -> Self {
        Self {
            facial: BASE_WEIGHT_FACIAL,
            voice: BASE_WEIGHT_VOICE,
            text: BASE_WEIGHT_TEXT,
        }
    }
}

/// Fusion result: one VAD score plus an aggregate confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusedVad {
    pub vad: VadScore,
    pub confidence: f64,
}

pub struct FusionEngine {
    weights: ChannelWeights,
}

impl FusionEngine {
    /// Build an engine from a weight table. A zero, negative, or non-finite
    /// weight is a configuration error and aborts initialization.
    pub fn new(weights: ChannelWeights) -> Result<Self> {
        for (name, w) in [
            ("facial", weights.facial),
            ("voice", weights.voice),
            ("text", weights.text),
        ] {
            if !w.is_finite() || w <= 0.0 {
                bail!("invalid fusion weight for {name} channel: {w}");
            }
        }
        Ok(Self { weights })
    }

    pub fn from_config(config: &AttuneConfig) -> Result<Self> {
        Self::new(ChannelWeights {
            facial: config.fusion_weight_facial,
            voice: config.fusion_weight_voice,
            text: config.fusion_weight_text,
        })
    }

    /// Normalize each present channel and collect (vad, confidence, base weight).
    fn present_channels(&self, input: &ModalityInput) -> Vec<(VadScore, f64, f64)> {
        let mut channels = Vec::with_capacity(CHANNEL_COUNT);
        if let Some(facial) = &input.facial {
            channels.push((
                normalize_vad(facial.vad_score),
                normalize_confidence(facial.confidence),
                self.weights.facial,
            ));
        }
        if let Some(voice) = &input.voice {
            channels.push((
                normalize_vad(voice.vad_score),
                normalize_confidence(voice.confidence),
                self.weights.voice,
            ));
        }
        if let Some(text) = &input.text {
            channels.push((
                normalize_vad(text.vad_score),
                normalize_confidence(text.confidence),
                self.weights.text,
            ));
        }
        channels
    }

    /// Effective weights (base × confidence) normalized over present channels.
    /// Empty input yields an empty vector, never a division by zero.
    pub fn normalized_weights(channels: &[(VadScore, f64, f64)]) -> Vec<f64> {
        let total: f64 = channels.iter().map(|(_, conf, base)| base * conf).sum();
        if total <= 0.0 {
            return Vec::new();
        }
        channels
            .iter()
            .map(|(_, conf, base)| base * conf / total)
            .collect()
    }

    /// Fuse zero-to-three channels into one VAD score plus aggregate confidence.
    ///
    /// With no channels present the neutral point is returned at confidence
    /// 0.5: "no signal" is itself a well-defined answer, not an error.
    pub fn fuse(&self, input: &ModalityInput) -> FusedVad {
        let channels = self.present_channels(input);
        if channels.is_empty() {
            return FusedVad {
                vad: VadScore::NEUTRAL,
                confidence: 0.5,
            };
        }

        let weights = Self::normalized_weights(&channels);

        let mut vad = VadScore::new(0.0, 0.0, 0.0);
        for ((channel_vad, _, _), weight) in channels.iter().zip(&weights) {
            vad.valence += channel_vad.valence * weight;
            vad.arousal += channel_vad.arousal * weight;
            vad.dominance += channel_vad.dominance * weight;
        }

        FusedVad {
            vad: normalize_vad(vad),
            confidence: Self::aggregate_confidence(&channels),
        }
    }

    /// Mean channel confidence scaled by a modality-count bonus, so agreement
    /// across channels raises confidence but a single channel cannot reach
    /// the top of the range on its own.
    fn aggregate_confidence(channels: &[(VadScore, f64, f64)]) -> f64 {
        let avg: f64 =
            channels.iter().map(|(_, conf, _)| conf).sum::<f64>() / channels.len() as f64;
        let count_bonus = (channels.len() as f64 / CHANNEL_COUNT as f64).min(1.0);
        avg * (0.7 + 0.3 * count_bonus)
    }
}
