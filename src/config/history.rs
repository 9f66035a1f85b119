//! Persisted-state configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the connector keeps endpoint history and last-used settings
/// between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Path of the JSON state file
    pub path: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("scribelink-state.json"),
        }
    }
}
