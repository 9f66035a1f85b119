//! Native inference-server protocol adapter.

use super::{trim_base_url, AdapterError, ProtocolAdapter, ProtocolKind, WireCompletion, WireRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Adapter for the native inference-server API (Ollama-style).
///
/// - Model listing via GET /api/tags
/// - Generation via POST /api/generate (stream disabled)
pub struct NativeAdapter {
    /// Shared HTTP client for connection pooling
    client: Arc<Client>,
}

impl NativeAdapter {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

/// /api/tags response format
#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<TagModel>,
}

#[derive(Deserialize)]
struct TagModel {
    name: String,
}

/// /api/generate response format (stream=false)
#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[async_trait]
impl ProtocolAdapter for NativeAdapter {
    fn kind(&self) -> ProtocolKind {
        ProtocolKind::Native
    }

    async fn list_models(
        &self,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Vec<String>, AdapterError> {
        let url = format!("{}/api/tags", trim_base_url(base_url));
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

        let tags: TagsResponse = serde_json::from_str(&body).map_err(|e| {
            AdapterError::InvalidResponse(format!("Failed to parse tags response: {}", e))
        })?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn generate(
        &self,
        base_url: &str,
        request: &WireRequest,
        timeout: Duration,
    ) -> Result<WireCompletion, AdapterError> {
        let url = format!("{}/api/generate", trim_base_url(base_url));
        let timeout_ms = timeout.as_millis() as u64;

        let body = serde_json::json!({
            "model": request.model,
            "prompt": request.prompt,
            "stream": false,
            "options": {
                "num_predict": request.max_tokens,
                "temperature": request.temperature,
                "top_p": request.top_p,
            },
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

        let generated: GenerateResponse = response.json().await.map_err(|e| {
            AdapterError::InvalidResponse(format!("Failed to parse generate response: {}", e))
        })?;

        Ok(WireCompletion {
            content: generated.response,
            prompt_tokens: generated.prompt_eval_count.unwrap_or(0),
            completion_tokens: generated.eval_count.unwrap_or(0),
            model: generated.model,
        })
    }
}
