// src/emotion/types.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Valence-Arousal-Dominance coordinates, each in [0,1] once normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VadScore {
    pub valence: f64,
    pub arousal: f64,
    pub dominance: f64,
}

impl VadScore {
    pub const NEUTRAL: VadScore = VadScore {
        valence: 0.5,
        arousal: 0.5,
        dominance: 0.5,
    };

    pub fn new(valence: f64, arousal: f64, dominance: f64) -> Self {
        Self { valence, arousal, dominance }
    }
}

impl Default for VadScore {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Facial expression channel output, as delivered by the upstream detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacialAnalysis {
    pub vad_score: VadScore,
    pub confidence: f64,
    #[serde(default)]
    pub landmarks: Vec<(f64, f64)>,
    #[serde(default)]
    pub emotions: HashMap<String, f64>,
}

/// Acoustic features reported alongside a voice transcription.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub pitch: f64,
    pub tempo: f64,
    pub volume: f64,
    pub clarity: f64,
}

/// Voice tone channel output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceAnalysis {
    pub vad_score: VadScore,
    pub confidence: f64,
    #[serde(default)]
    pub transcription: String,
    #[serde(default)]
    pub audio_features: AudioFeatures,
}

/// Subjective intensity of a text message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    Medium,
    High,
}

/// Free-text channel output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnalysis {
    pub vad_score: VadScore,
    pub confidence: f64,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_emotion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<Intensity>,
}

/// One optional payload per channel; a channel is either fully present or absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModalityInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facial: Option<FacialAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<VoiceAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextAnalysis>,
}

impl ModalityInput {
    pub fn is_empty(&self) -> bool {
        self.facial.is_none() && self.voice.is_none() && self.text.is_none()
    }

    pub fn present_count(&self) -> usize {
        [self.facial.is_some(), self.voice.is_some(), self.text.is_some()]
            .iter()
            .filter(|p| **p)
            .count()
    }
}

/// Closed set of primary emotion labels produced by classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionTag {
    Happy,
    Sad,
    Angry,
    Excited,
    Surprised,
    Calm,
    Neutral,
}

impl EmotionTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionTag::Happy => "happy",
            EmotionTag::Sad => "sad",
            EmotionTag::Angry => "angry",
            EmotionTag::Excited => "excited",
            EmotionTag::Surprised => "surprised",
            EmotionTag::Calm => "calm",
            EmotionTag::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for EmotionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk tier, ordered so the most severe crossed threshold wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// Integrated multimodal analysis; transient, owned by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FusedAnalysis {
    #[serde(rename = "overallVAD")]
    pub overall_vad: VadScore,
    pub confidence: f64,
    pub primary_emotion: EmotionTag,
    pub secondary_emotions: Vec<String>,
    pub analysis: ModalityInput,
    pub recommendations: Vec<String>,
    pub risk_level: RiskLevel,
}

/// Persisted per-turn classification record; the read-only history source
/// for trend and pattern analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionSnapshot {
    pub timestamp: DateTime<Utc>,
    pub primary_emotion: String,
    pub vad_score: VadScore,
}
