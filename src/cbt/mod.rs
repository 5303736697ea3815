//! CBT strategy mapping and feedback
//!
//! Maps a classified emotion plus its VAD coordinates onto a structured
//! therapeutic strategy. The deterministic stage (lookup table + VAD
//! adjustments) always succeeds; an optional elaboration stage asks the
//! text-generation collaborator for a richer narrative and is discarded
//! wholesale if the response cannot be parsed.

pub mod feedback;
pub mod patterns;
pub mod strategy;

pub use feedback::{
    BehavioralStrategies, CbtFeedback, CognitiveTechniques, EmotionAssessment, ProgressTracking,
};
pub use patterns::PatternAnalysis;
pub use strategy::CbtStrategy;
