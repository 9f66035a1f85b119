//! Configuration module for the connector
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`SCRIBELINK_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use scribelink::config::ConnectorConfig;
//!
//! // Load defaults
//! let config = ConnectorConfig::default();
//! assert_eq!(config.health_check.interval_seconds, 30);
//!
//! // Parse from TOML
//! let toml = r#"
//! [discovery]
//! max_concurrent = 3
//! "#;
//! let config: ConnectorConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.discovery.max_concurrent, 3);
//! ```

pub mod discovery;
pub mod error;
pub mod generation;
pub mod history;
pub mod logging;
pub mod retry;

pub use discovery::DiscoveryConfig;
pub use error::ConfigError;
pub use generation::GenerationConfig;
pub use history::HistoryConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use retry::RetryConfig;

// Re-export HealthCheckConfig from the health module
pub use crate::health::HealthCheckConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified configuration for the connector.
///
/// Aggregates all configuration sections: discovery heuristics, health
/// checking, the request retry policy, generation defaults, persisted
/// state, and logging.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConnectorConfig {
    /// Candidate generation and probing settings
    pub discovery: DiscoveryConfig,
    /// Health check configuration
    pub health_check: HealthCheckConfig,
    /// Generic request retry policy
    pub retry: RetryConfig,
    /// Generation defaults and limits
    pub generation: GenerationConfig,
    /// Persisted endpoint history location
    pub history: HistoryConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ConnectorConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports SCRIBELINK_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("SCRIBELINK_MODEL") {
            self.generation.default_model = Some(model);
        }
        if let Ok(path) = std::env::var("SCRIBELINK_STATE_FILE") {
            self.history.path = path.into();
        }
        if let Ok(level) = std::env::var("SCRIBELINK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("SCRIBELINK_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }
        if let Ok(concurrent) = std::env::var("SCRIBELINK_MAX_CONCURRENT") {
            if let Ok(c) = concurrent.parse() {
                self.discovery.max_concurrent = c;
            }
        }
        self
    }
}
