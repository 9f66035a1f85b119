//! Shared helpers for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use scribelink::adapter::ProtocolKind;
use scribelink::probe::{EndpointProbe, EndpointTestResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// How a scripted endpoint responds to probes.
#[derive(Debug, Clone, Copy)]
pub enum ProbeRule {
    /// Always reports a working endpoint
    Always,
    /// Never works
    Never,
    /// Works only when probed with exactly this timeout (lets tests
    /// distinguish discovery probes from recovery probes)
    OnlyWithTimeout(Duration),
}

/// Deterministic `EndpointProbe` with call instrumentation: records every
/// probed endpoint, tracks the maximum number of concurrently in-flight
/// probes, and answers according to per-endpoint rules.
pub struct ScriptedProbe {
    rules: Mutex<HashMap<String, ProbeRule>>,
    calls: Mutex<Vec<String>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self {
            rules: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            delay: None,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Probe that holds each probe open for `delay`, for concurrency tests.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    pub fn set_rule(&self, endpoint: &str, rule: ProbeRule) {
        self.rules.lock().unwrap().insert(endpoint.to_string(), rule);
    }

    /// Every endpoint probed, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Highest number of probes that were in flight at the same instant.
    pub fn max_concurrent(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EndpointProbe for ScriptedProbe {
    async fn test_endpoint_detailed(&self, endpoint: &str, timeout: Duration) -> EndpointTestResult {
        self.calls.lock().unwrap().push(endpoint.to_string());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let rule = self
            .rules
            .lock()
            .unwrap()
            .get(endpoint)
            .copied()
            .unwrap_or(ProbeRule::Never);

        let working = match rule {
            ProbeRule::Always => true,
            ProbeRule::Never => false,
            ProbeRule::OnlyWithTimeout(required) => timeout == required,
        };

        EndpointTestResult {
            endpoint: endpoint.to_string(),
            is_working: working,
            response_time_ms: 1,
            models_available: if working {
                vec!["llama3.2:1b".to_string()]
            } else {
                Vec::new()
            },
            protocol: working.then_some(ProtocolKind::Native),
            error: (!working).then(|| "connection refused".to_string()),
            checked_at: Utc::now(),
        }
    }
}

/// Discovery config with every candidate source emptied out, so tests add
/// exactly the candidates they mean to.
pub fn empty_discovery_config() -> scribelink::config::DiscoveryConfig {
    scribelink::config::DiscoveryConfig {
        quick_probe_urls: vec![],
        address_patterns: vec![],
        ports: vec![],
        service_hostnames: vec![],
        dns_suffixes: vec![],
        max_concurrent: 5,
        quick_timeout_ms: 900,
        probe_timeout_ms: 1000,
    }
}
