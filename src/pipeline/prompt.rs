//! Prompt construction seam.
//!
//! The note-templating collaborator is out of the connector's scope; this
//! trait is the explicit injection point for it. The default implementation
//! wraps the transcript in a minimal SOAP instruction so the crate is usable
//! standalone.

use super::request::GenerationRequest;

/// Builds the prompt text sent to the model from a transcript and the
/// resolved request. Pure function of its inputs.
pub trait PromptBuilder: Send + Sync + 'static {
    fn build_prompt(&self, request: &GenerationRequest) -> String;
}

/// Default SOAP-note instruction template.
pub struct SoapPromptBuilder;

impl PromptBuilder for SoapPromptBuilder {
    fn build_prompt(&self, request: &GenerationRequest) -> String {
        let visit = request.visit_type.as_deref().unwrap_or("general consultation");
        let template = request.template_type.as_deref().unwrap_or("soap");

        format!(
            "You are a veterinary medical scribe. From the consultation transcript below, \
             write a structured {} note for a {}. Use the section headers SUBJECTIVE, \
             OBJECTIVE, ASSESSMENT, and PLAN. Only include information stated in the \
             transcript.\n\nTranscript:\n{}",
            template.to_uppercase(),
            visit,
            request.transcript
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;
    use crate::pipeline::request::GenerationOptions;

    fn request(visit_type: Option<&str>) -> GenerationRequest {
        GenerationRequest::build(
            "Patient presents with limping on the left hind leg.",
            GenerationOptions {
                visit_type: visit_type.map(str::to_string),
                ..Default::default()
            },
            &GenerationConfig::default(),
            "llama3.2".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_prompt_contains_transcript_and_sections() {
        let prompt = SoapPromptBuilder.build_prompt(&request(None));
        assert!(prompt.contains("limping on the left hind leg"));
        assert!(prompt.contains("SUBJECTIVE"));
        assert!(prompt.contains("PLAN"));
    }

    #[test]
    fn test_visit_type_threaded_through() {
        let prompt = SoapPromptBuilder.build_prompt(&request(Some("dental checkup")));
        assert!(prompt.contains("dental checkup"));
    }
}
