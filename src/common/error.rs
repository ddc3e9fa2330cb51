//! Error types for the harness
//!
//! Transport failures are turned into scenario diagnostics by the runner;
//! only configuration and usage errors ever reach `main`.

use std::time::Duration;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Transport Errors ===
    #[error("Request timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),

    #[error("Connection to {url} failed: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(String),

    // === Response Errors ===
    #[error("Response with status {status} is not valid JSON: {reason}")]
    MalformedBody { status: u16, reason: String },

    // === Configuration Errors ===
    #[error("Invalid base URL '{url}': {reason}. Set --base-url or NEXT_PUBLIC_BASE_URL to an http(s) URL")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Usage Errors ===
    #[error("Unknown scenario '{0}'. Use 'accommodation-harness list' to see available scenarios")]
    UnknownScenario(String),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a connection failure error for a request URL
    pub fn connection_failed(url: &str, reason: impl ToString) -> Self {
        Self::ConnectionFailed {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a malformed body error
    pub fn malformed_body(status: u16, reason: impl ToString) -> Self {
        Self::MalformedBody {
            status,
            reason: reason.to_string(),
        }
    }

    /// Whether this error came from the network rather than from the reply
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Timeout(_) | Error::ConnectionFailed { .. } | Error::Http(_)
        )
    }
}
