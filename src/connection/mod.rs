//! Connection state shared across discovery, health checking, recovery,
//! and the request pipeline.
//!
//! A single `ConnectionHandle` is owned by the connector and handed to every
//! collaborator. Mutation happens through short, non-async critical sections;
//! the `is_recovering` guard is a compare-and-swap so only one recovery can
//! ever be in flight.

use crate::probe::EndpointTestResult;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Health history entries retained per connection.
pub const HEALTH_HISTORY_CAP: usize = 10;

/// Connection lifecycle status.
///
/// Transitions: `Disconnected -> Connecting -> Connected`;
/// `Connected -> Connecting` (health warning) `-> Error` (threshold
/// exceeded) `-> Reconnecting` (recovery) `-> Connected` or `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    Error,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Reconnecting => "reconnecting",
            ConnectionStatus::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// One health check outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthRecord {
    pub timestamp: DateTime<Utc>,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Last error the connection observed, kept for status surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastError {
    pub kind: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Mutable connection state. Lives for the connector's lifetime.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionState {
    pub status: ConnectionStatus,
    pub status_message: String,
    pub active_endpoint: Option<String>,
    /// Working endpoints discovery has found, in first-seen order
    pub discovered_candidates: Vec<String>,
    pub consecutive_health_failures: u32,
    /// Bounded ring of recent health check outcomes
    pub health_history: VecDeque<HealthRecord>,
    pub last_error: Option<LastError>,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            status_message: "not connected".to_string(),
            active_endpoint: None,
            discovered_candidates: Vec::new(),
            consecutive_health_failures: 0,
            health_history: VecDeque::with_capacity(HEALTH_HISTORY_CAP),
            last_error: None,
        }
    }
}

impl ConnectionState {
    /// Append a health record, evicting the oldest past the cap.
    pub fn record_health(&mut self, record: HealthRecord) {
        if self.health_history.len() >= HEALTH_HISTORY_CAP {
            self.health_history.pop_front();
        }
        self.health_history.push_back(record);
    }

    /// Add a working endpoint to the discovered set, preserving first-seen
    /// order.
    pub fn record_discovered(&mut self, endpoint: &str) {
        if !self.discovered_candidates.iter().any(|e| e == endpoint) {
            self.discovered_candidates.push(endpoint.to_string());
        }
    }

    pub fn set_status(&mut self, status: ConnectionStatus, message: impl Into<String>) {
        self.status = status;
        self.status_message = message.into();
    }

    pub fn set_error(&mut self, kind: &str, message: impl Into<String>) {
        self.last_error = Some(LastError {
            kind: kind.to_string(),
            message: message.into(),
            timestamp: Utc::now(),
        });
    }
}

/// Shared handle over the connection state.
pub struct ConnectionHandle {
    state: Mutex<ConnectionState>,
    recovering: AtomicBool,
    /// Latest probe outcome per endpoint, for status surfaces
    reports: DashMap<String, EndpointTestResult>,
}

impl ConnectionHandle {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ConnectionState::default()),
            recovering: AtomicBool::new(false),
            reports: DashMap::new(),
        }
    }

    /// Run a closure against the state under the lock. The closure must not
    /// await.
    pub fn with<R>(&self, f: impl FnOnce(&mut ConnectionState) -> R) -> R {
        let mut state = self.state.lock().expect("connection state lock poisoned");
        f(&mut state)
    }

    /// Cloned snapshot for read-only consumers.
    pub fn snapshot(&self) -> ConnectionState {
        self.state
            .lock()
            .expect("connection state lock poisoned")
            .clone()
    }

    pub fn active_endpoint(&self) -> Option<String> {
        self.with(|s| s.active_endpoint.clone())
    }

    pub fn status(&self) -> ConnectionStatus {
        self.with(|s| s.status)
    }

    /// Claim the recovery guard. Returns false if a recovery is already in
    /// flight; the caller must not proceed in that case.
    pub fn begin_recovery(&self) -> bool {
        self.recovering
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Release the recovery guard so a later health check can retry.
    pub fn end_recovery(&self) {
        self.recovering.store(false, Ordering::SeqCst);
    }

    pub fn is_recovering(&self) -> bool {
        self.recovering.load(Ordering::SeqCst)
    }

    /// Remember the latest probe outcome for an endpoint.
    pub fn record_report(&self, result: EndpointTestResult) {
        self.reports.insert(result.endpoint.clone(), result);
    }

    /// Latest probe outcomes, most recently checked first.
    pub fn endpoint_reports(&self) -> Vec<EndpointTestResult> {
        let mut reports: Vec<_> = self.reports.iter().map(|e| e.value().clone()).collect();
        reports.sort_by(|a, b| b.checked_at.cmp(&a.checked_at));
        reports
    }
}

impl Default for ConnectionHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn health_record(healthy: bool) -> HealthRecord {
        HealthRecord {
            timestamp: Utc::now(),
            healthy,
            latency_ms: healthy.then_some(12),
            error: (!healthy).then(|| "connection refused".to_string()),
        }
    }

    #[test]
    fn test_health_history_bounded() {
        let mut state = ConnectionState::default();
        for _ in 0..25 {
            state.record_health(health_record(true));
        }
        assert_eq!(state.health_history.len(), HEALTH_HISTORY_CAP);
    }

    #[test]
    fn test_health_history_keeps_newest() {
        let mut state = ConnectionState::default();
        for i in 0..12 {
            let mut record = health_record(false);
            record.error = Some(format!("failure {}", i));
            state.record_health(record);
        }
        let newest = state.health_history.back().unwrap();
        assert_eq!(newest.error.as_deref(), Some("failure 11"));
        let oldest = state.health_history.front().unwrap();
        assert_eq!(oldest.error.as_deref(), Some("failure 2"));
    }

    #[test]
    fn test_discovered_candidates_dedup() {
        let mut state = ConnectionState::default();
        state.record_discovered("http://127.0.0.1:11434");
        state.record_discovered("http://localhost:8080");
        state.record_discovered("http://127.0.0.1:11434");
        assert_eq!(state.discovered_candidates.len(), 2);
    }

    #[test]
    fn test_recovery_guard_is_exclusive() {
        let handle = ConnectionHandle::new();
        assert!(handle.begin_recovery());
        assert!(!handle.begin_recovery());
        assert!(handle.is_recovering());
        handle.end_recovery();
        assert!(handle.begin_recovery());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ConnectionStatus::Reconnecting.to_string(), "reconnecting");
        assert_eq!(ConnectionStatus::Connected.to_string(), "connected");
    }
}
