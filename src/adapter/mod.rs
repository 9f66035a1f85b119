//! Protocol adapter abstraction layer.
//!
//! This module provides the `ProtocolAdapter` trait and the two wire-protocol
//! implementations the connector knows how to speak: the native
//! inference-server API and the OpenAI-compatible API. Every call site that
//! needs the try-native-then-fall-back-to-openai behavior goes through one
//! shared adapter chain instead of re-implementing the fallback.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

pub mod error;
pub mod native;
pub mod openai;
pub mod types;

pub use error::AdapterError;
pub use native::NativeAdapter;
pub use openai::OpenAiAdapter;
pub use types::{ProtocolKind, WireCompletion, WireRequest};

/// Unified interface over one wire protocol of an inference server.
///
/// Adapters are stateless beyond a shared HTTP client: the base URL is an
/// argument, not a field, because the same adapter instance is used to talk
/// to every candidate endpoint during discovery.
///
/// # Object Safety
///
/// This trait is object-safe and designed to be used as
/// `Arc<dyn ProtocolAdapter>`.
///
/// # Cancellation Safety
///
/// All async methods are cancellation-safe. Dropping a future aborts any
/// in-flight HTTP request.
#[async_trait]
pub trait ProtocolAdapter: Send + Sync + 'static {
    /// Which protocol this adapter speaks.
    fn kind(&self) -> ProtocolKind;

    /// List the model names the server at `base_url` offers.
    ///
    /// Implementations:
    /// - `NativeAdapter`: GET /api/tags, names from the `models` array
    /// - `OpenAiAdapter`: GET /v1/models, ids from the `data` array
    ///
    /// An empty list is a valid `Ok` result; callers decide whether that
    /// counts as a working endpoint.
    async fn list_models(
        &self,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Vec<String>, AdapterError>;

    /// Execute a non-streaming generation request against `base_url`.
    ///
    /// Implementations:
    /// - `NativeAdapter`: POST /api/generate
    /// - `OpenAiAdapter`: POST /v1/chat/completions
    async fn generate(
        &self,
        base_url: &str,
        request: &WireRequest,
        timeout: Duration,
    ) -> Result<WireCompletion, AdapterError>;
}

/// Build the adapter chain in fallback order: native first, then
/// OpenAI-compatible. This ordering is fixed; both adapters share the
/// given client for connection pooling.
pub fn adapter_chain(client: Arc<Client>) -> Vec<Arc<dyn ProtocolAdapter>> {
    vec![
        Arc::new(NativeAdapter::new(client.clone())),
        Arc::new(OpenAiAdapter::new(client)),
    ]
}

/// Strip a trailing slash so adapters can join paths uniformly.
pub(crate) fn trim_base_url(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_chain_order() {
        let chain = adapter_chain(Arc::new(Client::new()));
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].kind(), ProtocolKind::Native);
        assert_eq!(chain[1].kind(), ProtocolKind::OpenAi);
    }

    #[test]
    fn test_trim_base_url() {
        assert_eq!(trim_base_url("http://localhost:11434/"), "http://localhost:11434");
        assert_eq!(trim_base_url("http://localhost:11434"), "http://localhost:11434");
    }

    #[test]
    fn test_protocol_kind_display() {
        assert_eq!(ProtocolKind::Native.to_string(), "native");
        assert_eq!(ProtocolKind::OpenAi.to_string(), "openai");
    }
}
