//! Configuration for health checking.

use serde::{Deserialize, Serialize};

/// Configuration for active-endpoint health checking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Whether the background monitor runs at all
    pub enabled: bool,
    /// Seconds between health checks
    pub interval_seconds: u64,
    /// Timeout for each health probe (shorter than request timeout)
    pub timeout_seconds: u64,
    /// Consecutive failures before recovery is triggered
    pub failure_threshold: u32,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 30,
            timeout_seconds: 5,
            failure_threshold: 3,
        }
    }
}
