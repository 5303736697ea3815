//! Text-generation collaborator
//!
//! The core never depends on a concrete model API: callers talk to the
//! `TextGenerator` trait and treat the response as an opaque string. The
//! Gemini client is the production implementation; a missing API key puts it
//! in mock mode so every caller keeps a deterministic fallback path.

pub mod gemini;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

pub use gemini::GeminiClient;

/// Errors raised while interpreting a generation response. Callers treat
/// every variant the same way: discard the attempt and fall back.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("no JSON object found in response")]
    MissingJson,
    #[error("malformed JSON payload: {0}")]
    MalformedJson(#[from] serde_json::Error),
    #[error("response JSON has an unexpected shape")]
    UnexpectedShape,
}

/// Seam for the external generation collaborator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for a prompt. Implementations must enforce
    /// their own timeout; callers make a single attempt and fall back.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Extract the first-`{`-to-last-`}` span of a response and parse it as one
/// JSON object. Models often wrap their JSON in prose; the span match strips
/// that without needing a full grammar.
pub fn extract_json_object(text: &str) -> Result<serde_json::Value, LlmError> {
    let start = text.find('{').ok_or(LlmError::MissingJson)?;
    let end = text.rfind('}').ok_or(LlmError::MissingJson)?;
    if end < start {
        return Err(LlmError::MissingJson);
    }

    let value: serde_json::Value = serde_json::from_str(&text[start..=end])?;
    Ok(value)
}
