//! Request pipeline: validate, build, dispatch with retry, parse, and
//! quality-check generation requests against the active endpoint.
//!
//! This is the only layer that surfaces errors to the caller; everything it
//! throws is a `GenerateError` carrying remediation text.

mod error;
mod prompt;
mod request;
mod retry;

pub use error::GenerateError;
pub use prompt::{PromptBuilder, SoapPromptBuilder};
pub use request::{
    clamp_max_tokens, clamp_temperature, GenerationOptions, GenerationRequest,
    GenerationResponse, Usage, MAX_TOKENS_CEILING, TEMPERATURE_CEILING,
};
pub use retry::{retry_with_policy, RetryPolicy};

use crate::adapter::{ProtocolAdapter, ProtocolKind, WireCompletion, WireRequest};
use crate::config::GenerationConfig;
use crate::connection::{ConnectionHandle, ConnectionStatus};
use crate::events::{ConnectorEvent, EventBus};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Leading phrases that mark a well-formed response as a refusal rather
/// than a note.
const REFUSAL_MARKERS: [&str; 8] = [
    "sorry",
    "i'm sorry",
    "i am sorry",
    "i cannot",
    "i can't",
    "i'm unable",
    "i am unable",
    "as an ai",
];

pub struct RequestPipeline {
    adapters: Vec<Arc<dyn ProtocolAdapter>>,
    connection: Arc<ConnectionHandle>,
    events: EventBus,
    policy: RetryPolicy,
    generation: GenerationConfig,
    prompt_builder: Arc<dyn PromptBuilder>,
}

impl RequestPipeline {
    pub fn new(
        adapters: Vec<Arc<dyn ProtocolAdapter>>,
        connection: Arc<ConnectionHandle>,
        events: EventBus,
        policy: RetryPolicy,
        generation: GenerationConfig,
        prompt_builder: Arc<dyn PromptBuilder>,
    ) -> Self {
        Self {
            adapters,
            connection,
            events,
            policy,
            generation,
            prompt_builder,
        }
    }

    /// Generate a note from a transcript.
    pub async fn generate(
        &self,
        transcript: &str,
        options: GenerationOptions,
    ) -> Result<GenerationResponse, GenerateError> {
        let result = self.generate_inner(transcript, options).await;

        if let Err(error) = &result {
            self.connection.with(|s| {
                s.set_error(error.kind(), error.to_string());
            });
        }

        result
    }

    async fn generate_inner(
        &self,
        transcript: &str,
        options: GenerationOptions,
    ) -> Result<GenerationResponse, GenerateError> {
        if transcript.trim().is_empty() {
            return Err(GenerateError::InvalidRequest(
                "transcript must not be empty".to_string(),
            ));
        }

        let endpoint = self
            .connection
            .active_endpoint()
            .ok_or(GenerateError::NoEndpointFound)?;

        let model = self.select_model(&options, &endpoint).await;
        let request = GenerationRequest::build(transcript, options, &self.generation, model)?;

        let wire = WireRequest {
            model: request.model.clone(),
            prompt: self.prompt_builder.build_prompt(&request),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
        };

        tracing::info!(
            request_id = %request.request_id,
            model = %request.model,
            endpoint = %endpoint,
            max_tokens = request.max_tokens,
            "Dispatching generation request"
        );

        let timeout = Duration::from_secs(self.generation.timeout_seconds);
        let start = Instant::now();

        let (completion, protocol) =
            retry_with_policy(&self.policy, |_attempt| self.dispatch_once(&endpoint, &wire, timeout))
                .await?;

        let duration_ms = start.elapsed().as_millis() as u64;
        let total_tokens = completion.total_tokens();
        let content = validate_content(completion.content)?;

        // A served request is as good as a health probe
        let transitioned = self.connection.with(|s| {
            s.consecutive_health_failures = 0;
            if s.status != ConnectionStatus::Connected {
                s.set_status(ConnectionStatus::Connected, format!("connected to {}", endpoint));
                true
            } else {
                false
            }
        });
        if transitioned {
            self.events.emit(ConnectorEvent::StatusChanged {
                status: ConnectionStatus::Connected,
                message: format!("connected to {}", endpoint),
                endpoint: Some(endpoint.clone()),
            });
        }

        tracing::info!(
            request_id = %request.request_id,
            duration_ms,
            protocol = %protocol,
            "Generation complete"
        );

        Ok(GenerationResponse {
            content,
            usage: Usage {
                prompt_tokens: completion.prompt_tokens,
                completion_tokens: completion.completion_tokens,
                total_tokens,
            },
            model: completion.model.unwrap_or(request.model),
            duration_ms,
            request_id: request.request_id,
            protocol,
        })
    }

    /// One dispatch attempt: native protocol first, then the
    /// OpenAI-compatible fallback against the same base URL. The error
    /// surfaced is the last adapter's; earlier failures are logged.
    async fn dispatch_once(
        &self,
        endpoint: &str,
        wire: &WireRequest,
        timeout: Duration,
    ) -> Result<(WireCompletion, ProtocolKind), GenerateError> {
        let mut last_error: Option<GenerateError> = None;

        for adapter in &self.adapters {
            match adapter.generate(endpoint, wire, timeout).await {
                Ok(completion) => return Ok((completion, adapter.kind())),
                Err(error) => {
                    tracing::debug!(
                        protocol = %adapter.kind(),
                        error = %error,
                        "Protocol dispatch failed, trying next"
                    );
                    last_error = Some(error.into());
                }
            }
        }

        Err(last_error.unwrap_or(GenerateError::NoEndpointFound))
    }

    /// Resolve the model to use: explicit request, configured default, the
    /// endpoint's first listed model, then the hardcoded fallback.
    async fn select_model(&self, options: &GenerationOptions, endpoint: &str) -> String {
        if let Some(model) = &options.model {
            return model.clone();
        }
        if let Some(model) = &self.generation.default_model {
            return model.clone();
        }

        let timeout = Duration::from_secs(self.generation.timeout_seconds.min(5));
        for adapter in &self.adapters {
            if let Ok(models) = adapter.list_models(endpoint, timeout).await {
                if let Some(first) = models.into_iter().next() {
                    tracing::debug!(model = %first, "Using first model advertised by endpoint");
                    return first;
                }
            }
        }

        tracing::debug!(model = %self.generation.fallback_model, "Falling back to configured model name");
        self.generation.fallback_model.clone()
    }
}

/// Reject empty bodies and refusal-shaped content.
fn validate_content(content: String) -> Result<String, GenerateError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(GenerateError::Parse(
            "response contained no generated text".to_string(),
        ));
    }

    if is_refusal(trimmed) {
        let preview: String = trimmed.chars().take(120).collect();
        return Err(GenerateError::ServiceDeclined(preview));
    }

    Ok(content)
}

/// A response is a refusal if it opens with an apology/decline marker.
fn is_refusal(content: &str) -> bool {
    let lowered = content
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    REFUSAL_MARKERS
        .iter()
        .any(|marker| lowered.starts_with(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refusal_detection() {
        assert!(is_refusal("Sorry, I can't help with that."));
        assert!(is_refusal("I'm sorry, but I cannot assist."));
        assert!(is_refusal("  \"I am unable to produce medical records.\""));
        assert!(is_refusal("As an AI, I should not do this."));
    }

    #[test]
    fn test_legitimate_note_is_not_refusal() {
        assert!(!is_refusal("SUBJECTIVE: Owner reports lethargy for 2 days."));
        // Refusal markers mid-text don't count
        assert!(!is_refusal("ASSESSMENT: The owner is sorry the visit was delayed."));
    }

    #[test]
    fn test_validate_content_empty() {
        assert!(matches!(
            validate_content("   ".to_string()),
            Err(GenerateError::Parse(_))
        ));
    }

    #[test]
    fn test_validate_content_refusal() {
        assert!(matches!(
            validate_content("I cannot write that note.".to_string()),
            Err(GenerateError::ServiceDeclined(_))
        ));
    }

    #[test]
    fn test_validate_content_passthrough() {
        let content = "SUBJECTIVE: doing well.".to_string();
        assert_eq!(validate_content(content.clone()).unwrap(), content);
    }
}
