//! OpenAI-compatible protocol adapter.

use super::{trim_base_url, AdapterError, ProtocolAdapter, ProtocolKind, WireCompletion, WireRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Adapter for servers exposing the OpenAI-compatible API shape
/// (LM Studio, vLLM, llama.cpp server, and Ollama's /v1 surface).
///
/// - Model listing via GET /v1/models
/// - Generation via POST /v1/chat/completions (stream disabled)
pub struct OpenAiAdapter {
    /// Shared HTTP client for connection pooling
    client: Arc<Client>,
}

impl OpenAiAdapter {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

/// /v1/models response format
#[derive(Deserialize)]
struct ModelsResponse {
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}

/// /v1/chat/completions response format (non-streaming)
#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[async_trait]
impl ProtocolAdapter for OpenAiAdapter {
    fn kind(&self) -> ProtocolKind {
        ProtocolKind::OpenAi
    }

    async fn list_models(
        &self,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Vec<String>, AdapterError> {
        let url = format!("{}/v1/models", trim_base_url(base_url));
        let timeout_ms = timeout.as_millis() as u64;

        let response = self
            .client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| AdapterError::from_reqwest(e, timeout_ms))?;

        if !response.status().is_success() {
            return Err(AdapterError::Upstream {
                status: response.status().as_u16(),
                message: format!("Failed to list models: {}", response.status()),
            });
        }

        let body = response.text().await.map_err(|e| {
            AdapterError::InvalidResponse(format!("Failed to read response body: {}", e))
        })?;

        let models: ModelsResponse = serde_json::from_str(&body).map_err(|e| {
            AdapterError::InvalidResponse(format!("Failed to parse models response: {}", e))
        })?;

        Ok(models.data.into_iter().map(|m| m.id).collect())
    }

    async fn generate(
        &self,
        base_url: &str,
        request: &WireRequest,
        timeout: Duration,
    ) -> Result<WireCompletion, AdapterError> {
        let url = format!("{}/v1/chat/completions", trim_base_url(base_url));
        let timeout_ms = timeout.as_millis() as u64;

        let body = serde_json::json!({
            "model": request.model,
            "messages": [{"role": "user", "content": request.prompt}],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "top_p": request.top_p,
            "stream": false,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| AdapterError::from_reqwest(e, timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AdapterError::Upstream {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            AdapterError::InvalidResponse(format!("Failed to parse completion response: {}", e))
        })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| {
                AdapterError::InvalidResponse("Completion response has no choices".to_string())
            })?;

        let usage = completion.usage.unwrap_or(Usage {
            prompt_tokens: 0,
            completion_tokens: 0,
        });

        Ok(WireCompletion {
            content,
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            model: completion.model,
        })
    }
}
