//! Wire-level request/response types shared by the protocol adapters.

use serde::{Deserialize, Serialize};

/// Which wire protocol an adapter speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolKind {
    /// Native inference-server API (`/api/tags`, `/api/generate`).
    Native,
    /// OpenAI-compatible API (`/v1/models`, `/v1/chat/completions`).
    OpenAi,
}

impl std::fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolKind::Native => write!(f, "native"),
            ProtocolKind::OpenAi => write!(f, "openai"),
        }
    }
}

/// Protocol-agnostic generation request handed to an adapter.
///
/// The pipeline builds this after validation and parameter clamping;
/// adapters translate it into their protocol's body shape.
#[derive(Debug, Clone, PartialEq)]
pub struct WireRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

/// Protocol-agnostic completion returned by an adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct WireCompletion {
    /// Generated text. May be empty; the pipeline validates that.
    pub content: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    /// Model the server reports having used, when it says so.
    pub model: Option<String>,
}

impl WireCompletion {
    pub fn total_tokens(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}
