//! Ollama text-generation client
//!
//! Implements `GenerateClient` against a local Ollama server's
//! `/api/generate` endpoint, with bounded retries and exponential backoff
//! for transient errors.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::client::GenerateClient;
use super::error::LlmError;
use crate::config::LlmConfig;

/// Maximum number of retries for transient errors
const MAX_RETRIES: u32 = 3;

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}

/// Ollama generation client
pub struct OllamaClient {
    model: String,
    base_url: String,
    http: Client,
    temperature: f64,
    timeout: Duration,
}

impl OllamaClient {
    /// Create a new client from configuration
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(model = %config.model, base_url = %config.base_url, "from_config: called");
        let timeout = Duration::from_millis(config.timeout_ms);

        let http = Client::builder().timeout(timeout).build().map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            http,
            temperature: config.temperature,
            timeout,
        })
    }

    /// Build the request body for the generate endpoint
    ///
    /// Context is appended to the prompt as a JSON block; Ollama's generate
    /// API takes a single prompt string.
    fn build_request_body(&self, prompt: &str, context: &serde_json::Value) -> serde_json::Value {
        let full_prompt = if context.is_null() || context == &serde_json::json!({}) {
            prompt.to_string()
        } else {
            format!("{prompt}\n\nContext:\n{context}")
        };

        serde_json::json!({
            "model": self.model,
            "prompt": full_prompt,
            "stream": false,
            "options": { "temperature": self.temperature },
        })
    }
}

#[async_trait]
impl GenerateClient for OllamaClient {
    async fn generate(&self, prompt: &str, context: &serde_json::Value) -> Result<String, LlmError> {
        debug!(model = %self.model, prompt_len = prompt.len(), "generate: called");
        let url = format!("{}/api/generate", self.base_url);
        let body = self.build_request_body(prompt, context);

        let mut last_error = None;
        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let backoff = INITIAL_BACKOFF_MS * 2u64.pow(attempt - 1);
                warn!(attempt, backoff_ms = backoff, "generate: retrying after transient error");
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            let response = match self.http.post(url.clone()).json(&body).send().await {
                Ok(r) => r,
                Err(e) if e.is_timeout() => {
                    debug!(attempt, "generate: timeout");
                    last_error = Some(LlmError::Timeout(self.timeout));
                    continue;
                }
                Err(e) => {
                    debug!(attempt, error = %e, "generate: network error");
                    last_error = Some(LlmError::Network(e));
                    continue;
                }
            };

            let status = response.status().as_u16();

            if is_retryable_status(status) && attempt < MAX_RETRIES {
                let text = response.text().await.unwrap_or_default();
                debug!(attempt, status, "generate: retryable error");
                last_error = Some(LlmError::ApiError { status, message: text });
                continue;
            }

            if !response.status().is_success() {
                debug!(status, "generate: API error");
                let text = response.text().await.unwrap_or_default();
                return Err(LlmError::ApiError { status, message: text });
            }

            let api_response: OllamaResponse = response.json().await?;
            let text = api_response.response.trim().to_string();
            if text.is_empty() {
                return Err(LlmError::InvalidResponse("model returned empty response".to_string()));
            }

            debug!(response_len = text.len(), "generate: success");
            return Ok(text);
        }

        Err(last_error.unwrap_or_else(|| LlmError::InvalidResponse("max retries exceeded".to_string())))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> OllamaClient {
        OllamaClient {
            model: "llama3.2:3b".to_string(),
            base_url: "http://localhost:11434".to_string(),
            http: Client::new(),
            temperature: 0.7,
            timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn test_build_request_body_basic() {
        let client = test_client();
        let body = client.build_request_body("Analyze Paris", &serde_json::json!({}));

        assert_eq!(body["model"], "llama3.2:3b");
        assert_eq!(body["prompt"], "Analyze Paris");
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn test_build_request_body_with_context() {
        let client = test_client();
        let ctx = serde_json::json!({"hotels": 5});
        let body = client.build_request_body("Analyze Paris", &ctx);

        let prompt = body["prompt"].as_str().unwrap();
        assert!(prompt.starts_with("Analyze Paris"));
        assert!(prompt.contains("\"hotels\":5"));
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(503));
        assert!(!is_retryable_status(400));
        assert!(!is_retryable_status(404));
    }
}
