//! Health monitoring for the active endpoint.
//!
//! A background task probes the active endpoint on a fixed interval (plus
//! once immediately on start), records outcomes in the bounded health
//! history, and hands off to the recovery coordinator once the
//! consecutive-failure threshold is crossed. Health checks never raise:
//! every outcome ends up in state, not in a panic or error return.

mod config;

pub use config::HealthCheckConfig;

use crate::connection::{ConnectionHandle, ConnectionStatus, HealthRecord};
use crate::events::{ConnectorEvent, EventBus};
use crate::probe::EndpointProbe;
use crate::recovery::Recovery;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Background service that watches the active endpoint.
pub struct HealthMonitor {
    probe: Arc<dyn EndpointProbe>,
    connection: Arc<ConnectionHandle>,
    events: EventBus,
    recovery: Arc<Recovery>,
    config: HealthCheckConfig,
}

impl HealthMonitor {
    pub fn new(
        probe: Arc<dyn EndpointProbe>,
        connection: Arc<ConnectionHandle>,
        events: EventBus,
        recovery: Arc<Recovery>,
        config: HealthCheckConfig,
    ) -> Self {
        Self {
            probe,
            connection,
            events,
            recovery,
            config,
        }
    }

    /// Start the monitor loop. The first check runs immediately; subsequent
    /// checks run every `interval_seconds`. Returns a JoinHandle that
    /// resolves when the token is cancelled.
    pub fn start(self, cancel_token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            if !self.config.enabled {
                tracing::info!("Health monitoring disabled");
                return;
            }

            let mut interval =
                tokio::time::interval(Duration::from_secs(self.config.interval_seconds));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            tracing::info!(
                interval_seconds = self.config.interval_seconds,
                "Health monitor started"
            );

            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => {
                        tracing::info!("Health monitor shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        self.perform_health_check().await;
                    }
                }
            }
        })
    }

    /// Run one health check cycle against the active endpoint.
    ///
    /// Public so one-shot callers (CLI `health`) can reuse the exact
    /// monitor semantics without the timer.
    pub async fn perform_health_check(&self) {
        let Some(endpoint) = self.connection.active_endpoint() else {
            tracing::debug!("No active endpoint, skipping health check");
            return;
        };

        let timeout = Duration::from_secs(self.config.timeout_seconds);
        let result = self.probe.test_endpoint_detailed(&endpoint, timeout).await;
        let latency_ms = result.response_time_ms;
        let error = result.error.clone();
        let healthy = result.is_working;
        self.connection.record_report(result);

        if healthy {
            self.on_success(&endpoint, latency_ms);
        } else {
            self.on_failure(&endpoint, latency_ms, error).await;
        }
    }

    fn on_success(&self, endpoint: &str, latency_ms: u64) {
        let transitioned = self.connection.with(|s| {
            s.consecutive_health_failures = 0;
            s.record_health(HealthRecord {
                timestamp: Utc::now(),
                healthy: true,
                latency_ms: Some(latency_ms),
                error: None,
            });

            if s.status != ConnectionStatus::Connected {
                s.set_status(ConnectionStatus::Connected, format!("connected to {}", endpoint));
                true
            } else {
                false
            }
        });

        self.events.emit(ConnectorEvent::HealthReport {
            healthy: true,
            latency_ms: Some(latency_ms),
            consecutive_failures: 0,
        });

        if transitioned {
            tracing::info!(endpoint = endpoint, "Endpoint healthy again");
            self.events.emit(ConnectorEvent::StatusChanged {
                status: ConnectionStatus::Connected,
                message: format!("connected to {}", endpoint),
                endpoint: Some(endpoint.to_string()),
            });
        }
    }

    async fn on_failure(&self, endpoint: &str, latency_ms: u64, error: Option<String>) {
        let threshold = self.config.failure_threshold;

        let failures = self.connection.with(|s| {
            s.consecutive_health_failures += 1;
            s.record_health(HealthRecord {
                timestamp: Utc::now(),
                healthy: false,
                latency_ms: Some(latency_ms),
                error: error.clone(),
            });
            if let Some(message) = &error {
                s.set_error("health_check_failed", message.clone());
            }
            s.consecutive_health_failures
        });

        self.events.emit(ConnectorEvent::HealthReport {
            healthy: false,
            latency_ms: Some(latency_ms),
            consecutive_failures: failures,
        });

        tracing::warn!(
            endpoint = endpoint,
            failures,
            threshold,
            error = error.as_deref().unwrap_or("unknown"),
            "Health check failed"
        );

        if failures >= threshold {
            if self.connection.is_recovering() {
                tracing::debug!("Recovery already in flight, not re-triggering");
                return;
            }

            self.connection.with(|s| {
                s.set_status(
                    ConnectionStatus::Error,
                    format!("health check failed {} times, starting recovery", failures),
                )
            });
            self.events.emit(ConnectorEvent::StatusChanged {
                status: ConnectionStatus::Error,
                message: format!("health check failed {} times, starting recovery", failures),
                endpoint: Some(endpoint.to_string()),
            });

            self.recovery.recover().await;
        } else {
            let message = format!("health check failed ({}/{} failures)", failures, threshold);
            self.connection
                .with(|s| s.set_status(ConnectionStatus::Connecting, message.clone()));
            self.events.emit(ConnectorEvent::StatusChanged {
                status: ConnectionStatus::Connecting,
                message,
                endpoint: Some(endpoint.to_string()),
            });
        }
    }
}
