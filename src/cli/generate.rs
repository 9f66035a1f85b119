//! Generate command handler

use super::GenerateArgs;
use crate::connector::Connector;
use crate::pipeline::{GenerateError, GenerationOptions};
use anyhow::Context;
use std::io::Read;
use std::path::Path;

/// Handle `scribelink generate`: read a transcript, ensure a connection,
/// and print the generated note.
pub async fn handle_generate(args: &GenerateArgs, connector: &Connector) -> anyhow::Result<String> {
    let transcript = read_transcript(args.transcript.as_deref())?;

    // Reuse the active endpoint if one is set, otherwise discover first
    if connector.status().active_endpoint.is_none() {
        connector
            .discover()
            .await
            .context("No inference server was found. Start one and retry")?;
    }

    let options = GenerationOptions {
        model: args.model.clone(),
        max_tokens: args.max_tokens,
        temperature: args.temperature,
        visit_type: args.visit_type.clone(),
        ..Default::default()
    };

    match connector.generate(&transcript, options).await {
        Ok(response) => {
            if args.json {
                Ok(serde_json::to_string_pretty(&response)?)
            } else {
                eprintln!(
                    "Generated by {} via {} in {}ms ({} tokens)",
                    response.model,
                    response.protocol,
                    response.duration_ms,
                    response.usage.total_tokens
                );
                Ok(response.content)
            }
        }
        Err(error) => {
            let mut message = format!("{}\n  → {}", error, error.user_action());
            for suggestion in error.recovery_suggestions() {
                message.push_str(&format!("\n  • {}", suggestion));
            }
            if matches!(error, GenerateError::InvalidRequest(_)) {
                message.push_str("\n  (transcripts are read from the file argument or stdin)");
            }
            anyhow::bail!(message)
        }
    }
}

/// Read the transcript from a file, or stdin when no path (or "-") is given.
fn read_transcript(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read transcript file {}", path.display())),
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read transcript from stdin")?;
            Ok(buffer)
        }
    }
}
