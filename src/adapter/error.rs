//! Error types for protocol adapter operations.

use thiserror::Error;

/// Errors that can occur while talking to an inference server.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Network connectivity error (DNS, connection refused, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded deadline.
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Server returned an error response (4xx, 5xx).
    #[error("Server error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Server response doesn't match the expected wire format.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl AdapterError {
    /// Map a reqwest error, distinguishing timeouts from other transport
    /// failures. `timeout_ms` is the deadline that was in effect.
    pub fn from_reqwest(e: reqwest::Error, timeout_ms: u64) -> Self {
        if e.is_timeout() {
            AdapterError::Timeout(timeout_ms)
        } else {
            AdapterError::Network(e.to_string())
        }
    }
}
