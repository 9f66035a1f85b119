//! Typed connector event bus.
//!
//! Status changes, discovery progress, health outcomes, and recovery
//! lifecycle are fanned out to any number of subscribers over a broadcast
//! channel. Notifications are fire-and-forget: a send with no subscribers,
//! or to a lagging subscriber, is silently dropped.

use crate::connection::ConnectionStatus;
use serde::Serialize;
use tokio::sync::broadcast;

/// Which discovery phase a progress event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryStage {
    /// Sequential probing of high-probability candidates
    Quick,
    /// Concurrency-limited sweep of the full catalog
    Batch,
}

/// Notification emitted by the connector.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ConnectorEvent {
    StatusChanged {
        status: ConnectionStatus,
        message: String,
        endpoint: Option<String>,
    },
    DiscoveryProgress {
        stage: DiscoveryStage,
        current: usize,
        total: usize,
        message: String,
    },
    HealthReport {
        healthy: bool,
        latency_ms: Option<u64>,
        consecutive_failures: u32,
    },
    RecoveryStarted {
        reason: String,
    },
    RecoveryFinished {
        recovered: bool,
        endpoint: Option<String>,
    },
}

/// Multi-subscriber event bus backed by a broadcast channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ConnectorEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConnectorEvent> {
        self.sender.subscribe()
    }

    /// Emit an event. Errors (no receivers) are ignored.
    pub fn emit(&self, event: ConnectorEvent) {
        tracing::trace!(?event, "connector event");
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_delivery_to_multiple_subscribers() {
        let bus = EventBus::new(8);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.emit(ConnectorEvent::RecoveryStarted {
            reason: "health check threshold exceeded".to_string(),
        });

        assert!(matches!(
            first.recv().await.unwrap(),
            ConnectorEvent::RecoveryStarted { .. }
        ));
        assert!(matches!(
            second.recv().await.unwrap(),
            ConnectorEvent::RecoveryStarted { .. }
        ));
    }

    #[test]
    fn test_emit_without_subscribers_is_noop() {
        let bus = EventBus::new(8);
        // Must not panic or error
        bus.emit(ConnectorEvent::HealthReport {
            healthy: true,
            latency_ms: Some(20),
            consecutive_failures: 0,
        });
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let event = ConnectorEvent::DiscoveryProgress {
            stage: DiscoveryStage::Batch,
            current: 3,
            total: 12,
            message: "testing http://127.0.0.1:8080".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "discovery_progress");
        assert_eq!(json["stage"], "batch");
        assert_eq!(json["current"], 3);
    }
}
