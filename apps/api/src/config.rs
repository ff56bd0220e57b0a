use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::{LlmSettings, DEFAULT_API_URL};
use crate::matching::models::TopK;

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub oracle_url: String,
    pub oracle_timeout_secs: u64,
    pub oracle_max_tokens: u32,
    /// Oracle calls allowed in flight per run. 1 scores resumes one at a time.
    pub oracle_concurrency: usize,
    /// Used when a request does not name `top_k`.
    pub default_top_k: TopK,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Config {
            anthropic_api_key: lookup("ANTHROPIC_API_KEY").with_context(|| {
                "Required environment variable 'ANTHROPIC_API_KEY' is not set".to_string()
            })?,
            oracle_url: lookup("ORACLE_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            oracle_timeout_secs: parse_or(&lookup, "ORACLE_TIMEOUT_SECS", 120)?,
            oracle_max_tokens: parse_or(&lookup, "ORACLE_MAX_TOKENS", 1000)?,
            oracle_concurrency: parse_or(&lookup, "ORACLE_CONCURRENCY", 1)?,
            default_top_k: parse_or(&lookup, "DEFAULT_TOP_K", TopK::default())?,
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn llm_settings(&self) -> LlmSettings {
        LlmSettings {
            api_url: self.oracle_url.clone(),
            api_key: self.anthropic_api_key.clone(),
            timeout: Duration::from_secs(self.oracle_timeout_secs),
            max_tokens: self.oracle_max_tokens,
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
