//! Generation pipeline configuration

use serde::{Deserialize, Serialize};

/// Defaults and limits for generation requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Model to use when the caller doesn't name one
    pub default_model: Option<String>,
    /// Last-resort model name when the endpoint can't be asked either
    pub fallback_model: String,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
    /// max_tokens applied when the caller doesn't set one
    pub default_max_tokens: u32,
    /// Sampling temperature applied when the caller doesn't set one
    pub default_temperature: f32,
    /// Nucleus sampling applied when the caller doesn't set one
    pub default_top_p: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_model: None,
            fallback_model: "llama3.2".to_string(),
            timeout_seconds: 30,
            default_max_tokens: 1024,
            default_temperature: 0.3,
            default_top_p: 0.9,
        }
    }
}
