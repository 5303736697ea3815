// src/config/mod.rs

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct AttuneConfig {
    // ── Gemini Configuration
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_timeout: u64,

    // ── Database Configuration
    pub database_url: String,
    pub sqlite_max_connections: u32,

    // ── Context Window Configuration
    pub max_context_messages: usize,

    // ── Fusion Weights (per-channel base weights)
    pub fusion_weight_facial: f64,
    pub fusion_weight_voice: f64,
    pub fusion_weight_text: f64,

    // ── Server Configuration
    pub host: String,
    pub port: u16,
    pub request_timeout: u64,

    // ── Logging Configuration
    pub log_level: String,
}

fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            // Trim whitespace and strip trailing comments before parsing
            let clean_val = val.split('#').next().unwrap_or("").trim();
            clean_val.parse::<T>().unwrap_or(default)
        }
        Err(_) => default,
    }
}

impl AttuneConfig {
    pub fn from_env() -> Self {
        // Load from .env file first if it exists
        let _ = dotenvy::dotenv();

        Self {
            gemini_api_key: env_var_or("GEMINI_API_KEY", String::new()),
            gemini_model: env_var_or("ATTUNE_GEMINI_MODEL", "gemini-2.5-flash".to_string()),
            gemini_timeout: env_var_or("ATTUNE_GEMINI_TIMEOUT", 30),
            database_url: env_var_or("DATABASE_URL", "sqlite:./attune.db".to_string()),
            sqlite_max_connections: env_var_or("SQLITE_MAX_CONNECTIONS", 5),
            max_context_messages: env_var_or("ATTUNE_MAX_CONTEXT_MESSAGES", 20),
            fusion_weight_facial: env_var_or("ATTUNE_FUSION_WEIGHT_FACIAL", 0.40),
            fusion_weight_voice: env_var_or("ATTUNE_FUSION_WEIGHT_VOICE", 0.35),
            fusion_weight_text: env_var_or("ATTUNE_FUSION_WEIGHT_TEXT", 0.25),
            host: env_var_or("ATTUNE_HOST", "0.0.0.0".to_string()),
            port: env_var_or("ATTUNE_PORT", 3001),
            request_timeout: env_var_or("ATTUNE_REQUEST_TIMEOUT", 60),
            log_level: env_var_or("ATTUNE_LOG_LEVEL", "info".to_string()),
        }
    }

    /// Gemini is only usable with a real key; placeholder values mean mock mode.
    pub fn gemini_configured(&self) -> bool {
        !self.gemini_api_key.is_empty() && self.gemini_api_key != "your-gemini-api-key"
    }

    /// Get server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// Global config instance - loaded once at startup
pub static CONFIG: Lazy<AttuneConfig> = Lazy::new(AttuneConfig::from_env);
