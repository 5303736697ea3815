// src/llm/gemini.rs
//
// Gemini generateContent client, non-streaming. Without an API key the
// client runs in mock mode and returns canned counselor responses, so the
// rest of the system behaves identically in development and tests.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use super::TextGenerator;
use crate::config::AttuneConfig;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GeminiClient {
    client: HttpClient,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: String, timeout: Duration) -> Self {
        if api_key.is_none() {
            warn!("GEMINI_API_KEY is not configured, using mock responses");
        }
        Self {
            client: HttpClient::new(),
            api_key,
            model,
            timeout,
        }
    }

    pub fn from_config(config: &AttuneConfig) -> Self {
        let api_key = config
            .gemini_configured()
            .then(|| config.gemini_api_key.clone());
        Self::new(
            api_key,
            config.gemini_model.clone(),
            Duration::from_secs(config.gemini_timeout),
        )
    }

    pub fn is_mock(&self) -> bool {
        self.api_key.is_none()
    }

    async fn generate_content(&self, api_key: &str, prompt: &str) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_API_BASE, self.model, api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error: {} - {}", status, body);
        }

        let api_response: GeminiResponse = response.json().await?;

        if let Some(error) = &api_response.error {
            anyhow::bail!("Gemini error: {}", error.message);
        }

        let text = api_response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            anyhow::bail!("Gemini returned an empty candidate list");
        }

        Ok(text)
    }

    /// Canned counselor reply used when no API key is configured.
    fn mock_response(prompt: &str) -> String {
        info!("returning mock Gemini response ({} prompt chars)", prompt.chars().count());
        serde_json::json!({
            "content": "Thank you for sharing that. Could you tell me a bit more about \
                        what has been on your mind? Once I understand the situation \
                        better I can suggest a CBT technique that fits.",
            "emotionAnalysis": {
                "primaryEmotion": "neutral",
                "confidence": 0.7,
                "suggestions": [
                    "Deep breathing technique",
                    "Mindfulness meditation",
                    "Cognitive restructuring"
                ]
            }
        })
        .to_string()
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        match &self.api_key {
            Some(key) => self.generate_content(key, prompt).await,
            None => Ok(Self::mock_response(prompt)),
        }
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContentResponse,
}

#[derive(Deserialize)]
struct GeminiContentResponse {
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_means_mock_mode() {
        let client = GeminiClient::new(None, "gemini-2.5-flash".into(), Duration::from_secs(30));
        assert!(client.is_mock());
    }

    #[tokio::test]
    async fn test_mock_response_is_parseable_json() {
        let client = GeminiClient::new(None, "gemini-2.5-flash".into(), Duration::from_secs(30));
        let response = client.generate("hello").await.unwrap();
        let value = crate::llm::extract_json_object(&response).unwrap();
        assert!(value.get("content").is_some());
    }
}
