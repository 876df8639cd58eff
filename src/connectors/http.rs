//! Shared HTTP plumbing for the Google API connectors
//!
//! One `HttpConnector` per upstream service: carries the reqwest client with
//! its timeout, the API key, the retry policy, and the rate limiter that
//! enforces minimum spacing between outbound requests.

use std::time::Duration;

use reqwest::Client;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::error::ConnectorError;
use crate::config::ConnectorConfig;

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}

/// HTTP client wrapper with retry, timeout, and rate limiting
pub struct HttpConnector {
    service: &'static str,
    http: Client,
    api_key: String,
    max_retries: u32,
    timeout: Duration,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl HttpConnector {
    /// Create a connector for a named service from configuration
    ///
    /// The API key is read from the environment variable named in config.
    pub fn from_config(service: &'static str, config: &ConnectorConfig) -> Result<Self, ConnectorError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| ConnectorError::InvalidResponse {
            service,
            message: format!("API key not found in ${}", config.api_key_env),
        })?;

        Self::new(service, api_key, config)
    }

    /// Create a connector with an explicit API key
    pub fn new(service: &'static str, api_key: String, config: &ConnectorConfig) -> Result<Self, ConnectorError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder()
            .timeout(timeout)
            .user_agent("tripgraph/0.1")
            .build()
            .map_err(ConnectorError::Network)?;

        let min_interval = if config.requests_per_minute > 0 {
            Duration::from_secs_f64(60.0 / config.requests_per_minute as f64)
        } else {
            Duration::ZERO
        };

        Ok(Self {
            service,
            http,
            api_key,
            max_retries: config.max_retries,
            timeout,
            min_interval,
            last_request: Mutex::new(None),
        })
    }

    /// Enforce minimum spacing between outbound requests
    async fn rate_limit(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!(service = self.service, wait_ms = wait.as_millis() as u64, "rate_limit: spacing request");
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// GET a JSON document with retry and backoff
    ///
    /// The API key is appended to the query parameters. Retryable statuses
    /// and network errors are retried up to the configured limit; anything
    /// else is returned immediately.
    pub async fn get_json(&self, url: &str, params: &[(&str, String)]) -> Result<serde_json::Value, ConnectorError> {
        debug!(service = self.service, url, "get_json: called");

        let mut query: Vec<(&str, String)> = params.to_vec();
        query.push(("key", self.api_key.clone()));

        let mut last_error = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = INITIAL_BACKOFF_MS * 2u64.pow(attempt - 1);
                warn!(
                    service = self.service,
                    attempt,
                    backoff_ms = backoff,
                    "get_json: retrying after transient error"
                );
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            self.rate_limit().await;

            let response = match self.http.get(url).query(&query).send().await {
                Ok(r) => r,
                Err(e) if e.is_timeout() => {
                    debug!(service = self.service, attempt, "get_json: timeout");
                    last_error = Some(ConnectorError::Timeout(self.timeout));
                    continue;
                }
                Err(e) => {
                    debug!(service = self.service, attempt, error = %e, "get_json: network error");
                    last_error = Some(ConnectorError::Network(e));
                    continue;
                }
            };

            let status = response.status().as_u16();

            if is_retryable_status(status) && attempt < self.max_retries {
                let text = response.text().await.unwrap_or_default();
                debug!(service = self.service, attempt, status, "get_json: retryable error");
                last_error = Some(ConnectorError::ApiError {
                    service: self.service,
                    status,
                    message: text,
                });
                continue;
            }

            if !response.status().is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(ConnectorError::ApiError {
                    service: self.service,
                    status,
                    message: text,
                });
            }

            let body = response.json().await.map_err(ConnectorError::Network)?;
            debug!(service = self.service, "get_json: success");
            return Ok(body);
        }

        Err(last_error.unwrap_or_else(|| ConnectorError::InvalidResponse {
            service: self.service,
            message: "max retries exceeded".to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectorConfig;

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(500));
        assert!(is_retryable_status(503));
        assert!(!is_retryable_status(400));
        assert!(!is_retryable_status(403));
    }

    #[test]
    fn test_min_interval_from_config() {
        let config = ConnectorConfig {
            requests_per_minute: 30,
            ..Default::default()
        };
        let conn = HttpConnector::new("test", "key".to_string(), &config).unwrap();
        assert_eq!(conn.min_interval, Duration::from_secs(2));
    }

    #[test]
    fn test_zero_rate_limit_disables_spacing() {
        let config = ConnectorConfig {
            requests_per_minute: 0,
            ..Default::default()
        };
        let conn = HttpConnector::new("test", "key".to_string(), &config).unwrap();
        assert!(conn.min_interval.is_zero());
    }
}
