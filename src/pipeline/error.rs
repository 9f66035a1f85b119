//! Error taxonomy for the request pipeline.
//!
//! The pipeline is the only layer allowed to surface errors to the caller,
//! and every error it throws carries a human-readable remediation string
//! plus recovery suggestions so a UI can render actionable guidance instead
//! of a stack trace.

use crate::adapter::AdapterError;
use thiserror::Error;

/// Errors surfaced by `generate`.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Transport/connection failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Deadline exceeded; the underlying transfer was cancelled.
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// Server answered with a non-2xx status.
    #[error("Server error {status}: {message}")]
    Http { status: u16, message: String },

    /// Response body was malformed or missing the generated text.
    #[error("Could not parse server response: {0}")]
    Parse(String),

    /// Well-formed response whose content is a refusal, not a note.
    #[error("Model declined the request: {0}")]
    ServiceDeclined(String),

    /// Caller-supplied parameters outside policy (where not auto-clamped).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No active endpoint to dispatch against.
    #[error("No working endpoint is available")]
    NoEndpointFound,

    /// A retryable error persisted through every attempt.
    #[error("Request failed after {attempts} attempts: {source}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        source: Box<GenerateError>,
    },
}

impl GenerateError {
    /// Whether the generic retry policy should try again.
    ///
    /// Retryable: network, timeout, 5xx, 429. Everything else aborts
    /// immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerateError::Network(_) | GenerateError::Timeout(_) => true,
            GenerateError::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Human-readable remediation hint for the UI layer.
    pub fn user_action(&self) -> String {
        match self {
            GenerateError::Network(_) => {
                "Check that the inference server is running and reachable on your network".to_string()
            }
            GenerateError::Timeout(_) => {
                "The server is responding slowly. Try again, or use a smaller model".to_string()
            }
            GenerateError::Http { status: 401, .. } => {
                "The server rejected the request as unauthorized. Check its authentication settings"
                    .to_string()
            }
            GenerateError::Http { status: 404, .. } => {
                "The requested model or API path was not found. Verify the model is installed on the server"
                    .to_string()
            }
            GenerateError::Http { status: 429, .. } => {
                "The server is overloaded. Wait a moment and try again".to_string()
            }
            GenerateError::Http { status, .. } if *status >= 500 => {
                "The server hit an internal error. Restart it if the problem persists".to_string()
            }
            GenerateError::Http { .. } => {
                "The server rejected the request. Check the request parameters".to_string()
            }
            GenerateError::Parse(_) => {
                "The server sent an unexpected response. Verify it is a compatible inference server"
                    .to_string()
            }
            GenerateError::ServiceDeclined(_) => {
                "The model declined to write the note. Rephrase or shorten the transcript and try again"
                    .to_string()
            }
            GenerateError::InvalidRequest(_) => {
                "Provide a non-empty transcript before generating a note".to_string()
            }
            GenerateError::NoEndpointFound => {
                "Run discovery to locate an inference server before generating".to_string()
            }
            GenerateError::RetryExhausted { source, .. } => source.user_action(),
        }
    }

    /// Ordered recovery suggestions, broadest-first.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            GenerateError::Network(_) | GenerateError::NoEndpointFound => vec![
                "Confirm the inference server process is running",
                "Confirm this device and the server are on the same network",
                "Re-run endpoint discovery",
            ],
            GenerateError::Timeout(_) => vec![
                "Retry the request",
                "Switch to a smaller or faster model",
                "Increase the request timeout in the configuration",
            ],
            GenerateError::Http { status, .. } if *status >= 500 || *status == 429 => vec![
                "Wait and retry",
                "Restart the inference server",
            ],
            GenerateError::RetryExhausted { source, .. } => source.recovery_suggestions(),
            _ => vec![],
        }
    }

    /// Short machine-readable kind, used for the connection's last-error
    /// record.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerateError::Network(_) => "network",
            GenerateError::Timeout(_) => "timeout",
            GenerateError::Http { .. } => "http",
            GenerateError::Parse(_) => "parse",
            GenerateError::ServiceDeclined(_) => "service_declined",
            GenerateError::InvalidRequest(_) => "invalid_request",
            GenerateError::NoEndpointFound => "no_endpoint",
            GenerateError::RetryExhausted { .. } => "retry_exhausted",
        }
    }
}

impl From<AdapterError> for GenerateError {
    fn from(e: AdapterError) -> Self {
        match e {
            AdapterError::Network(message) => GenerateError::Network(message),
            AdapterError::Timeout(ms) => GenerateError::Timeout(ms),
            AdapterError::Upstream { status, message } => GenerateError::Http { status, message },
            AdapterError::InvalidResponse(message) => GenerateError::Parse(message),
        }
    }
}
