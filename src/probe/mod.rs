//! Endpoint prober.
//!
//! A probe is a bounded-time liveness/capability check against a single
//! candidate URL. Probes never propagate errors: every outcome, including
//! timeouts and unreachable hosts, is folded into an `EndpointTestResult`.

use crate::adapter::{AdapterError, ProtocolAdapter, ProtocolKind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Outcome of probing a single endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointTestResult {
    /// Base URL that was probed
    pub endpoint: String,
    /// True only if a non-empty model list was obtained under either protocol
    pub is_working: bool,
    /// Wall-clock duration of the whole attempt
    pub response_time_ms: u64,
    /// Models the endpoint reported
    pub models_available: Vec<String>,
    /// Protocol that answered, when one did
    pub protocol: Option<ProtocolKind>,
    /// Why the probe failed, when it did
    pub error: Option<String>,
    /// When the probe completed
    pub checked_at: DateTime<Utc>,
}

impl EndpointTestResult {
    fn failure(endpoint: &str, elapsed_ms: u64, error: String) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            is_working: false,
            response_time_ms: elapsed_ms,
            models_available: Vec::new(),
            protocol: None,
            error: Some(error),
            checked_at: Utc::now(),
        }
    }
}

/// Transport seam for everything that probes endpoints.
///
/// Discovery, health checking, and recovery all depend on this trait rather
/// than on `Prober` directly, so tests can substitute a deterministic
/// implementation without any network.
#[async_trait]
pub trait EndpointProbe: Send + Sync + 'static {
    /// Probe `endpoint`, bounding the whole attempt by `timeout`.
    async fn test_endpoint_detailed(
        &self,
        endpoint: &str,
        timeout: Duration,
    ) -> EndpointTestResult;

    /// Boolean shorthand for callers that only need liveness.
    async fn test_endpoint(&self, endpoint: &str, timeout: Duration) -> bool {
        self.test_endpoint_detailed(endpoint, timeout).await.is_working
    }
}

/// Real prober backed by the protocol adapter chain.
pub struct Prober {
    adapters: Vec<Arc<dyn ProtocolAdapter>>,
}

impl Prober {
    pub fn new(adapters: Vec<Arc<dyn ProtocolAdapter>>) -> Self {
        Self { adapters }
    }

    /// Try each protocol in chain order until one yields a non-empty model
    /// list. Returns the winning protocol and models, or the last error.
    async fn try_protocols(
        &self,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<(ProtocolKind, Vec<String>), String> {
        let mut last_error = "no protocol adapters configured".to_string();

        for adapter in &self.adapters {
            match adapter.list_models(endpoint, timeout).await {
                Ok(models) if !models.is_empty() => return Ok((adapter.kind(), models)),
                Ok(_) => {
                    last_error = format!("{} protocol returned an empty model list", adapter.kind());
                }
                Err(e) => {
                    tracing::debug!(
                        endpoint = endpoint,
                        protocol = %adapter.kind(),
                        error = %e,
                        "Probe attempt failed"
                    );
                    last_error = e.to_string();
                }
            }
        }

        Err(last_error)
    }
}

#[async_trait]
impl EndpointProbe for Prober {
    async fn test_endpoint_detailed(
        &self,
        endpoint: &str,
        timeout: Duration,
    ) -> EndpointTestResult {
        let start = Instant::now();

        // Outer deadline covers the full protocol fallback chain; dropping
        // the future aborts whichever HTTP request is in flight.
        let outcome = tokio::time::timeout(timeout, self.try_protocols(endpoint, timeout)).await;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        metrics::histogram!("scribelink_probe_latency_seconds",
            "endpoint" => endpoint.to_string()
        )
        .record(elapsed_ms as f64 / 1000.0);

        let result = match outcome {
            Ok(Ok((protocol, models))) => EndpointTestResult {
                endpoint: endpoint.to_string(),
                is_working: true,
                response_time_ms: elapsed_ms,
                models_available: models,
                protocol: Some(protocol),
                error: None,
                checked_at: Utc::now(),
            },
            Ok(Err(error)) => EndpointTestResult::failure(endpoint, elapsed_ms, error),
            Err(_) => EndpointTestResult::failure(
                endpoint,
                elapsed_ms,
                AdapterError::Timeout(timeout.as_millis() as u64).to_string(),
            ),
        };

        metrics::counter!("scribelink_probes_total",
            "outcome" => if result.is_working { "working" } else { "failed" }
        )
        .increment(1);

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::adapter_chain;
    use mockito::Server;
    use reqwest::Client;

    fn test_prober() -> Prober {
        Prober::new(adapter_chain(Arc::new(Client::new())))
    }

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_working_native_endpoint() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_body(r#"{"models":[{"name":"llama3.2:1b"}]}"#)
            .create_async()
            .await;

        let result = test_prober()
            .test_endpoint_detailed(&server.url(), TIMEOUT)
            .await;

        assert!(result.is_working);
        assert_eq!(result.protocol, Some(ProtocolKind::Native));
        assert_eq!(result.models_available, vec!["llama3.2:1b"]);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_falls_back_to_openai_protocol() {
        let mut server = Server::new_async().await;
        // Native endpoint missing, OpenAI-compatible one present
        server
            .mock("GET", "/api/tags")
            .with_status(404)
            .create_async()
            .await;
        server
            .mock("GET", "/v1/models")
            .with_status(200)
            .with_body(r#"{"data":[{"id":"qwen2.5-7b-instruct"}]}"#)
            .create_async()
            .await;

        let result = test_prober()
            .test_endpoint_detailed(&server.url(), TIMEOUT)
            .await;

        assert!(result.is_working);
        assert_eq!(result.protocol, Some(ProtocolKind::OpenAi));
        assert_eq!(result.models_available, vec!["qwen2.5-7b-instruct"]);
    }

    #[tokio::test]
    async fn test_empty_model_list_is_not_working() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_body(r#"{"models":[]}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/v1/models")
            .with_status(200)
            .with_body(r#"{"data":[]}"#)
            .create_async()
            .await;

        let result = test_prober()
            .test_endpoint_detailed(&server.url(), TIMEOUT)
            .await;

        assert!(!result.is_working);
        assert!(result.error.unwrap().contains("empty model list"));
    }

    #[tokio::test]
    async fn test_unreachable_host_returns_false() {
        let working = test_prober()
            .test_endpoint("http://invalid-host-that-does-not-exist:9999", TIMEOUT)
            .await;
        assert!(!working);
    }

    #[tokio::test]
    async fn test_malformed_json_is_not_working() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_body("<html>definitely not json</html>")
            .create_async()
            .await;
        server
            .mock("GET", "/v1/models")
            .with_status(200)
            .with_body("<html>also not json</html>")
            .create_async()
            .await;

        let result = test_prober()
            .test_endpoint_detailed(&server.url(), TIMEOUT)
            .await;
        assert!(!result.is_working);
    }
}
