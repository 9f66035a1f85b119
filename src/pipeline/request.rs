//! Generation request and response types.
//!
//! Out-of-range sampling parameters are clamped into policy rather than
//! rejected; only an empty transcript is a hard validation error.

use super::error::GenerateError;
use crate::adapter::ProtocolKind;
use crate::config::GenerationConfig;
use serde::Serialize;
use uuid::Uuid;

/// Upper bound on max_tokens after clamping.
pub const MAX_TOKENS_CEILING: u32 = 8192;
/// Upper bound on temperature after clamping.
pub const TEMPERATURE_CEILING: f32 = 2.0;

/// Caller-facing knobs for a generation call. All optional; defaults come
/// from `GenerationConfig`.
#[derive(Debug, Clone, Default)]
pub struct GenerationOptions {
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub template_type: Option<String>,
    pub visit_type: Option<String>,
    pub request_id: Option<String>,
}

/// Validated, clamped request ready for dispatch.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub transcript: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub template_type: Option<String>,
    pub visit_type: Option<String>,
    pub request_id: String,
}

impl GenerationRequest {
    /// Validate the transcript and resolve every knob against the defaults,
    /// clamping out-of-range values into policy.
    pub fn build(
        transcript: &str,
        options: GenerationOptions,
        defaults: &GenerationConfig,
        model: String,
    ) -> Result<Self, GenerateError> {
        if transcript.trim().is_empty() {
            return Err(GenerateError::InvalidRequest(
                "transcript must not be empty".to_string(),
            ));
        }

        Ok(Self {
            transcript: transcript.to_string(),
            model,
            max_tokens: clamp_max_tokens(options.max_tokens.unwrap_or(defaults.default_max_tokens)),
            temperature: clamp_temperature(
                options.temperature.unwrap_or(defaults.default_temperature),
            ),
            top_p: options.top_p.unwrap_or(defaults.default_top_p).clamp(0.0, 1.0),
            template_type: options.template_type,
            visit_type: options.visit_type,
            request_id: options
                .request_id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
        })
    }
}

/// Clamp max_tokens into [1, 8192]. Silent leniency, not an error.
pub fn clamp_max_tokens(value: u32) -> u32 {
    value.clamp(1, MAX_TOKENS_CEILING)
}

/// Clamp temperature into [0.0, 2.0]. NaN falls back to 0.0.
pub fn clamp_temperature(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, TEMPERATURE_CEILING)
    }
}

/// Token usage reported for a completed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Successful generation outcome handed back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResponse {
    pub content: String,
    pub usage: Usage,
    pub model: String,
    pub duration_ms: u64,
    pub request_id: String,
    /// Which wire protocol ultimately served the request
    pub protocol: ProtocolKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn defaults() -> GenerationConfig {
        GenerationConfig::default()
    }

    #[test]
    fn test_empty_transcript_rejected() {
        let result = GenerationRequest::build(
            "   \n  ",
            GenerationOptions::default(),
            &defaults(),
            "llama3.2".to_string(),
        );
        assert!(matches!(result, Err(GenerateError::InvalidRequest(_))));
    }

    #[test]
    fn test_oversized_max_tokens_clamped() {
        let request = GenerationRequest::build(
            "Patient presents with lethargy",
            GenerationOptions {
                max_tokens: Some(999_999),
                ..Default::default()
            },
            &defaults(),
            "llama3.2".to_string(),
        )
        .unwrap();
        assert_eq!(request.max_tokens, MAX_TOKENS_CEILING);
    }

    #[test]
    fn test_zero_max_tokens_clamped_up() {
        assert_eq!(clamp_max_tokens(0), 1);
    }

    #[test]
    fn test_temperature_clamped_both_ways() {
        assert_eq!(clamp_temperature(5.0), 2.0);
        assert_eq!(clamp_temperature(-1.0), 0.0);
        assert_eq!(clamp_temperature(0.7), 0.7);
        assert_eq!(clamp_temperature(f32::NAN), 0.0);
    }

    #[test]
    fn test_defaults_applied() {
        let request = GenerationRequest::build(
            "Patient presents with lethargy",
            GenerationOptions::default(),
            &defaults(),
            "llama3.2".to_string(),
        )
        .unwrap();
        assert_eq!(request.max_tokens, defaults().default_max_tokens);
        assert_eq!(request.temperature, defaults().default_temperature);
        assert!(!request.request_id.is_empty());
    }

    #[test]
    fn test_explicit_request_id_preserved() {
        let request = GenerationRequest::build(
            "Patient presents with lethargy",
            GenerationOptions {
                request_id: Some("req-42".to_string()),
                ..Default::default()
            },
            &defaults(),
            "llama3.2".to_string(),
        )
        .unwrap();
        assert_eq!(request.request_id, "req-42");
    }

    proptest! {
        #[test]
        fn prop_max_tokens_always_in_range(value in any::<u32>()) {
            let clamped = clamp_max_tokens(value);
            prop_assert!((1..=MAX_TOKENS_CEILING).contains(&clamped));
        }

        #[test]
        fn prop_temperature_always_in_range(value in -100.0f32..100.0) {
            let clamped = clamp_temperature(value);
            prop_assert!((0.0..=TEMPERATURE_CEILING).contains(&clamped));
        }
    }
}
