//! Connector error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur talking to external data sources
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("{service} API error {status}: {message}")]
    ApiError {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Invalid response from {service}: {message}")]
    InvalidResponse { service: &'static str, message: String },

    #[error("Location not found: {0}")]
    LocationNotFound(String),
}

impl ConnectorError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            ConnectorError::ApiError { status, .. } => *status >= 500 || *status == 429 || *status == 408,
            ConnectorError::Network(_) => true,
            ConnectorError::Timeout(_) => true,
            ConnectorError::InvalidResponse { .. } => false,
            ConnectorError::LocationNotFound(_) => false,
        }
    }
}
