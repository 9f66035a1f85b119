//! Endpoint discovery orchestrator.
//!
//! Finds a working inference server among the candidate catalog. The quick
//! path probes a short priority list sequentially (history first), which
//! covers the common case of the same endpoint being reused session to
//! session; the full path sweeps the whole catalog in concurrency-limited
//! batches, short-circuiting as soon as a batch produces a winner.

use crate::catalog;
use crate::config::DiscoveryConfig;
use crate::connection::{ConnectionHandle, ConnectionStatus};
use crate::events::{ConnectorEvent, DiscoveryStage, EventBus};
use crate::history::HistoryStore;
use crate::probe::EndpointProbe;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Expected outcome when the whole catalog was swept without a hit,
    /// not a programming error.
    #[error("no working endpoint found after testing {tested} candidates")]
    NoEndpointFound { tested: usize },
}

/// Per-run discovery options.
#[derive(Debug, Clone)]
pub struct DiscoverOptions {
    /// Concurrency cap for batch probing
    pub max_concurrent: usize,
    /// Probe the high-probability priority list before the full sweep
    pub quick_test_first: bool,
}

impl Default for DiscoverOptions {
    fn default() -> Self {
        Self {
            max_concurrent: 5,
            quick_test_first: true,
        }
    }
}

/// Orchestrates candidate probing and records the winner.
pub struct Discovery {
    probe: Arc<dyn EndpointProbe>,
    history: Arc<HistoryStore>,
    connection: Arc<ConnectionHandle>,
    events: EventBus,
    config: DiscoveryConfig,
}

impl Discovery {
    pub fn new(
        probe: Arc<dyn EndpointProbe>,
        history: Arc<HistoryStore>,
        connection: Arc<ConnectionHandle>,
        events: EventBus,
        config: DiscoveryConfig,
    ) -> Self {
        Self {
            probe,
            history,
            connection,
            events,
            config,
        }
    }

    /// Find a working endpoint, adopt it, and return its URL.
    pub async fn discover(&self, options: &DiscoverOptions) -> Result<String, DiscoveryError> {
        self.connection.with(|s| {
            s.set_status(ConnectionStatus::Connecting, "searching for inference server")
        });
        self.events.emit(ConnectorEvent::StatusChanged {
            status: ConnectionStatus::Connecting,
            message: "searching for inference server".to_string(),
            endpoint: None,
        });

        let history = self.history.endpoints();

        if options.quick_test_first {
            if let Some(endpoint) = self.quick_path(&history).await {
                self.adopt(&endpoint);
                return Ok(endpoint);
            }
        }

        let tested = match self.batch_path(&history, options.max_concurrent).await {
            Ok(endpoint) => {
                self.adopt(&endpoint);
                return Ok(endpoint);
            }
            Err(tested) => tested,
        };

        tracing::info!(tested, "Discovery exhausted the candidate catalog");
        self.connection.with(|s| {
            s.set_status(ConnectionStatus::Disconnected, "no working endpoint found");
            s.set_error("no_endpoint_found", "discovery exhausted all candidates");
        });
        self.events.emit(ConnectorEvent::StatusChanged {
            status: ConnectionStatus::Disconnected,
            message: "no working endpoint found".to_string(),
            endpoint: None,
        });

        Err(DiscoveryError::NoEndpointFound { tested })
    }

    /// Sequentially probe the priority list with the short quick timeout,
    /// returning on the first hit.
    async fn quick_path(&self, history: &[String]) -> Option<String> {
        let candidates = catalog::quick_candidates(history, &self.config);
        let timeout = Duration::from_millis(self.config.quick_timeout_ms);
        let total = candidates.len();

        for (index, endpoint) in candidates.iter().enumerate() {
            self.events.emit(ConnectorEvent::DiscoveryProgress {
                stage: DiscoveryStage::Quick,
                current: index + 1,
                total,
                message: format!("testing {}", endpoint),
            });

            let result = self.probe.test_endpoint_detailed(endpoint, timeout).await;
            let is_working = result.is_working;
            self.connection.record_report(result);

            if is_working {
                tracing::info!(endpoint = %endpoint, "Quick-path probe succeeded");
                return Some(endpoint.clone());
            }
        }

        None
    }

    /// Sweep the full catalog in batches of `max_concurrent`, stopping at
    /// the first batch containing a winner. Returns Err(tested) on
    /// exhaustion.
    async fn batch_path(&self, history: &[String], max_concurrent: usize) -> Result<String, usize> {
        let candidates = catalog::build_candidates(history, &self.config);
        let timeout = Duration::from_millis(self.config.probe_timeout_ms);
        let total = candidates.len();
        let batch_size = max_concurrent.max(1);
        let mut tested = 0;

        for batch in candidates.chunks(batch_size) {
            let probes = batch
                .iter()
                .map(|endpoint| self.probe.test_endpoint_detailed(endpoint, timeout));
            let results = futures::future::join_all(probes).await;

            let mut winner = None;
            for result in results {
                tested += 1;
                self.events.emit(ConnectorEvent::DiscoveryProgress {
                    stage: DiscoveryStage::Batch,
                    current: tested,
                    total,
                    message: format!("tested {}", result.endpoint),
                });

                if result.is_working && winner.is_none() {
                    winner = Some(result.endpoint.clone());
                }
                self.connection.record_report(result);
            }

            if let Some(endpoint) = winner {
                tracing::info!(endpoint = %endpoint, tested, "Batch probe found a working endpoint");
                return Ok(endpoint);
            }
        }

        Err(tested)
    }

    /// Persist the winner and flip the connection to connected.
    fn adopt(&self, endpoint: &str) {
        if let Err(e) = self.history.record_success(endpoint) {
            tracing::warn!(error = %e, "Failed to persist endpoint history");
        }

        self.connection.with(|s| {
            s.active_endpoint = Some(endpoint.to_string());
            s.record_discovered(endpoint);
            s.consecutive_health_failures = 0;
            s.set_status(ConnectionStatus::Connected, format!("connected to {}", endpoint));
        });

        self.events.emit(ConnectorEvent::StatusChanged {
            status: ConnectionStatus::Connected,
            message: format!("connected to {}", endpoint),
            endpoint: Some(endpoint.to_string()),
        });
    }
}
