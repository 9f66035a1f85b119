//! Persisted endpoint history and last-used settings.
//!
//! A small JSON document on disk carries the working-endpoint history
//! (front-inserted, capped) and the user's last-used endpoint/settings
//! across sessions, so the next discovery's quick path can reuse them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Endpoint history entries retained.
pub const HISTORY_CAP: usize = 10;

/// Errors from reading or writing the state file.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse state file: {0}")]
    Parse(String),
}

/// Settings remembered between sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedSettings {
    pub default_model: Option<String>,
    pub template_type: Option<String>,
    pub visit_type: Option<String>,
}

/// The on-disk document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    /// Previously-successful endpoints, most recent first, capped
    pub endpoint_history: Vec<String>,
    /// Endpoint that served the last session
    pub last_endpoint: Option<String>,
    pub settings: PersistedSettings,
}

/// Store over the persisted state file.
///
/// All mutation goes through this handle; every successful mutation is
/// flushed to disk via a temp file + rename so a crash can't leave a
/// half-written document.
pub struct HistoryStore {
    path: PathBuf,
    state: Mutex<PersistedState>,
}

impl HistoryStore {
    /// Open the store, reading existing state if present. A missing file is
    /// a normal first run; a corrupt file is logged and replaced with
    /// defaults rather than failing startup.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match Self::read(&path) {
            Ok(state) => state,
            Err(HistoryError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                PersistedState::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "State file unreadable, starting fresh");
                PersistedState::default()
            }
        };

        Self {
            path,
            state: Mutex::new(state),
        }
    }

    fn read(path: &Path) -> Result<PersistedState, HistoryError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| HistoryError::Parse(e.to_string()))
    }

    fn write(&self, state: &PersistedState) -> Result<(), HistoryError> {
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| HistoryError::Parse(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Cloned snapshot of the persisted state.
    pub fn snapshot(&self) -> PersistedState {
        self.state.lock().expect("history lock poisoned").clone()
    }

    /// Endpoint history, most recent first.
    pub fn endpoints(&self) -> Vec<String> {
        self.state
            .lock()
            .expect("history lock poisoned")
            .endpoint_history
            .clone()
    }

    /// Record a working endpoint: front-insert, dedup, cap, persist. Also
    /// remembers it as the last-used endpoint.
    pub fn record_success(&self, endpoint: &str) -> Result<(), HistoryError> {
        let state = {
            let mut state = self.state.lock().expect("history lock poisoned");
            state.endpoint_history.retain(|e| e != endpoint);
            state.endpoint_history.insert(0, endpoint.to_string());
            state.endpoint_history.truncate(HISTORY_CAP);
            state.last_endpoint = Some(endpoint.to_string());
            state.clone()
        };
        self.write(&state)
    }

    /// Persist updated settings.
    pub fn save_settings(&self, settings: PersistedSettings) -> Result<(), HistoryError> {
        let state = {
            let mut state = self.state.lock().expect("history lock poisoned");
            state.settings = settings;
            state.clone()
        };
        self.write(&state)
    }
}
