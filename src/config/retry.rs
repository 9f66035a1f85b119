//! Retry policy configuration

use serde::{Deserialize, Serialize};

/// Backoff parameters for the generic request retry policy.
///
/// Distinct from the recovery coordinator's fixed 1s/2s/4s ladder, which
/// deliberately carries no jitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// First retry delay in milliseconds
    pub base_delay_ms: u64,
    /// Ceiling on a single delay in milliseconds
    pub max_delay_ms: u64,
    /// Exponential growth factor between attempts
    pub backoff_multiplier: f64,
    /// Random jitter added on top of each delay (0..=jitter_max_ms)
    pub jitter_max_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 8000,
            backoff_multiplier: 2.0,
            jitter_max_ms: 250,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_config_defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.base_delay_ms, 1000);
        assert_eq!(config.max_delay_ms, 8000);
    }
}
