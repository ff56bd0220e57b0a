/// LLM Client: the single point of entry for all Claude API calls in the matcher.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// Scoring goes through `matching::oracle`, which owns the prompt and calls this client.
///
/// One request per call. Retrying is the caller's decision, and the matcher never retries:
/// a failed call degrades to a fallback score instead.
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all scoring calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-20250514";

/// Failure of a single LLM call. The variants are kept apart because the matcher
/// degrades differently for each.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Service unreachable, request timed out, or the reply envelope could not be decoded.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status (quota, auth, overload, ...).
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first non-blank text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .filter(|b| b.block_type == "text")
            .filter_map(|b| b.text.as_deref())
            .find(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Connection settings for `LlmClient`.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_url: String,
    pub api_key: String,
    pub timeout: Duration,
    pub max_tokens: u32,
}

/// Thin wrapper over the Anthropic Messages API.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_url: String,
    api_key: String,
    max_tokens: u32,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: settings.api_url,
            api_key: settings.api_key,
            max_tokens: settings.max_tokens,
        })
    }

    /// Makes exactly one call to the Claude API and returns the reply text.
    pub async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: self.max_tokens,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        if let Some(usage) = &llm_response.usage {
            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                usage.input_tokens, usage.output_tokens
            );
        }

        llm_response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(url: String, timeout: Duration) -> LlmClient {
        LlmClient::new(LlmSettings {
            api_url: url,
            api_key: "test-key".to_string(),
            timeout,
            max_tokens: 1000,
        })
        .unwrap()
    }

    fn text_reply(text: &str) -> serde_json::Value {
        json!({
            "content": [{"type": "text", "text": text}],
            "usage": {"input_tokens": 12, "output_tokens": 34}
        })
    }

    #[tokio::test]
    async fn test_complete_returns_first_text_block() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .and(body_string_contains("Seeking lab intern"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("{\"score\":88}")))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(server.uri(), Duration::from_secs(5));
        let text = client
            .complete("Seeking lab intern", "system")
            .await
            .unwrap();
        assert_eq!(text, "{\"score\":88}");
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "type": "error",
                "error": {"type": "rate_limit_error", "message": "quota exceeded"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(server.uri(), Duration::from_secs(5));
        match client.complete("prompt", "system").await {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 429);
                assert_eq!(message, "quota exceeded");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(server.uri(), Duration::from_secs(5));
        let err = client.complete("prompt", "system").await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 503, ref message } if message == "overloaded"));
    }

    #[tokio::test]
    async fn test_missing_text_is_empty_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": []})))
            .mount(&server)
            .await;

        let client = client_for(server.uri(), Duration::from_secs(5));
        let err = client.complete("prompt", "system").await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }

    #[tokio::test]
    async fn test_blank_text_is_empty_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("   ")))
            .mount(&server)
            .await;

        let client = client_for(server.uri(), Duration::from_secs(5));
        let err = client.complete("prompt", "system").await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_http_error() {
        // Nothing listens on the discard port.
        let client = client_for("http://127.0.0.1:9/v1/messages".to_string(), Duration::from_secs(2));
        let err = client.complete("prompt", "system").await.unwrap_err();
        assert!(matches!(err, LlmError::Http(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(text_reply("late"))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = client_for(server.uri(), Duration::from_millis(50));
        match client.complete("prompt", "system").await {
            Err(LlmError::Http(e)) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn test_text_skips_non_text_blocks() {
        let response: LlmResponse = serde_json::from_value(json!({
            "content": [
                {"type": "tool_use"},
                {"type": "text", "text": "hello"}
            ]
        }))
        .unwrap();
        assert_eq!(response.text(), Some("hello"));
    }
}
