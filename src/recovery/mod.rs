//! Recovery coordinator.
//!
//! When the active endpoint fails persistently, recovery walks an ordered
//! strategy list, halting on the first success:
//!
//! 1. re-test the current endpoint directly (handles transient blips)
//! 2. retry the current endpoint with a fixed 1s/2s/4s backoff ladder
//! 3. re-run discovery with a small concurrency cap, quick path enabled
//! 4. walk the persisted history, excluding the failed endpoint
//!
//! Recovery is non-reentrant: a trigger while one is in flight is a no-op.

use crate::connection::{ConnectionHandle, ConnectionStatus};
use crate::discovery::{DiscoverOptions, Discovery};
use crate::events::{ConnectorEvent, EventBus};
use crate::history::HistoryStore;
use crate::probe::EndpointProbe;
use std::sync::Arc;
use std::time::Duration;

/// Backoff ladder for strategy 2. Deliberately jitter-free, unlike the
/// request retry policy.
const RETRY_DELAYS: [Duration; 3] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(4),
];

/// Concurrency cap used when recovery re-runs discovery.
const REDISCOVERY_CONCURRENCY: usize = 3;

pub struct Recovery {
    probe: Arc<dyn EndpointProbe>,
    history: Arc<HistoryStore>,
    connection: Arc<ConnectionHandle>,
    events: EventBus,
    discovery: Arc<Discovery>,
    probe_timeout: Duration,
}

impl Recovery {
    pub fn new(
        probe: Arc<dyn EndpointProbe>,
        history: Arc<HistoryStore>,
        connection: Arc<ConnectionHandle>,
        events: EventBus,
        discovery: Arc<Discovery>,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            probe,
            history,
            connection,
            events,
            discovery,
            probe_timeout,
        }
    }

    /// Attempt recovery. Returns true if a working endpoint was adopted.
    ///
    /// A call while another recovery is in flight does nothing and returns
    /// false.
    pub async fn recover(&self) -> bool {
        if !self.connection.begin_recovery() {
            tracing::debug!("Recovery already in progress, ignoring trigger");
            return false;
        }

        self.connection.with(|s| {
            s.set_status(ConnectionStatus::Reconnecting, "attempting recovery")
        });
        self.events.emit(ConnectorEvent::RecoveryStarted {
            reason: "sustained health check failure".to_string(),
        });
        self.events.emit(ConnectorEvent::StatusChanged {
            status: ConnectionStatus::Reconnecting,
            message: "attempting recovery".to_string(),
            endpoint: self.connection.active_endpoint(),
        });

        let recovered = self.run_strategies().await;

        match &recovered {
            Some(endpoint) => {
                if let Err(e) = self.history.record_success(endpoint) {
                    tracing::warn!(error = %e, "Failed to persist endpoint history");
                }
                self.connection.with(|s| {
                    s.active_endpoint = Some(endpoint.clone());
                    s.record_discovered(endpoint);
                    s.consecutive_health_failures = 0;
                    s.set_status(
                        ConnectionStatus::Connected,
                        format!("recovered, connected to {}", endpoint),
                    );
                });
                self.events.emit(ConnectorEvent::StatusChanged {
                    status: ConnectionStatus::Connected,
                    message: format!("recovered, connected to {}", endpoint),
                    endpoint: Some(endpoint.clone()),
                });
                tracing::info!(endpoint = %endpoint, "Recovery succeeded");
            }
            None => {
                self.connection.with(|s| {
                    s.set_status(
                        ConnectionStatus::Error,
                        "recovery exhausted, manual intervention required",
                    );
                    s.set_error("recovery_exhausted", "all recovery strategies failed");
                });
                self.events.emit(ConnectorEvent::StatusChanged {
                    status: ConnectionStatus::Error,
                    message: "recovery exhausted, manual intervention required".to_string(),
                    endpoint: None,
                });
                tracing::warn!("Recovery exhausted all strategies");
            }
        }

        self.events.emit(ConnectorEvent::RecoveryFinished {
            recovered: recovered.is_some(),
            endpoint: recovered.clone(),
        });

        self.connection.end_recovery();
        recovered.is_some()
    }

    async fn run_strategies(&self) -> Option<String> {
        let current = self.connection.active_endpoint();

        // Strategy 1: cheap direct re-test of the current endpoint
        if let Some(endpoint) = &current {
            tracing::debug!(endpoint = %endpoint, "Recovery strategy 1: direct re-test");
            if self.probe.test_endpoint(endpoint, self.probe_timeout).await {
                return Some(endpoint.clone());
            }
        }

        // Strategy 2: backoff ladder against the current endpoint
        if let Some(endpoint) = &current {
            for (attempt, delay) in RETRY_DELAYS.iter().enumerate() {
                tracing::debug!(
                    endpoint = %endpoint,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Recovery strategy 2: backoff retry"
                );
                tokio::time::sleep(*delay).await;
                if self.probe.test_endpoint(endpoint, self.probe_timeout).await {
                    return Some(endpoint.clone());
                }
            }
        }

        // Strategy 3: full re-discovery, quick path first
        tracing::debug!("Recovery strategy 3: re-discovery");
        let options = DiscoverOptions {
            max_concurrent: REDISCOVERY_CONCURRENCY,
            quick_test_first: true,
        };
        if let Ok(endpoint) = self.discovery.discover(&options).await {
            return Some(endpoint);
        }

        // Strategy 4: walk history, excluding the endpoint that just failed
        tracing::debug!("Recovery strategy 4: history walk");
        for endpoint in self.history.endpoints() {
            if Some(&endpoint) == current.as_ref() {
                continue;
            }
            if self.probe.test_endpoint(&endpoint, self.probe_timeout).await {
                return Some(endpoint);
            }
        }

        None
    }
}
