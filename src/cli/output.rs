//! Output formatting helpers for CLI commands

use crate::probe::EndpointTestResult;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

/// View model for endpoint display
#[derive(Debug, Clone, serde::Serialize)]
pub struct EndpointView {
    pub endpoint: String,
    pub working: bool,
    pub protocol: Option<String>,
    pub models: Vec<String>,
    pub latency_ms: u64,
    pub error: Option<String>,
}

impl From<&EndpointTestResult> for EndpointView {
    fn from(result: &EndpointTestResult) -> Self {
        Self {
            endpoint: result.endpoint.clone(),
            working: result.is_working,
            protocol: result.protocol.map(|p| p.to_string()),
            models: result.models_available.clone(),
            latency_ms: result.response_time_ms,
            error: result.error.clone(),
        }
    }
}

/// Format endpoint reports as a table
pub fn format_endpoints_table(endpoints: &[EndpointView]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Endpoint", "Status", "Protocol", "Models", "Latency"]);

    for e in endpoints {
        let status_str = if e.working {
            "Working".green().to_string()
        } else {
            "Unreachable".red().to_string()
        };

        table.add_row(vec![
            Cell::new(&e.endpoint),
            Cell::new(status_str),
            Cell::new(e.protocol.as_deref().unwrap_or("-")),
            Cell::new(e.models.len()),
            Cell::new(format!("{}ms", e.latency_ms)),
        ]);
    }

    table.to_string()
}

/// Format endpoint reports as JSON
pub fn format_endpoints_json(endpoints: &[EndpointView]) -> String {
    serde_json::to_string_pretty(&json!({
        "endpoints": endpoints
    }))
    .unwrap()
}

/// Format a model listing as a table
pub fn format_models_table(endpoint: &str, protocol: Option<&str>, models: &[String]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Model", "Endpoint", "Protocol"]);

    for model in models {
        table.add_row(vec![
            Cell::new(model),
            Cell::new(endpoint),
            Cell::new(protocol.unwrap_or("-")),
        ]);
    }

    table.to_string()
}

/// Get status icon for a probe outcome
pub fn status_icon(working: bool) -> &'static str {
    if working {
        "✓"
    } else {
        "✗"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn view() -> EndpointView {
        EndpointView {
            endpoint: "http://127.0.0.1:11434".to_string(),
            working: true,
            protocol: Some("native".to_string()),
            models: vec!["llama3.2:1b".to_string()],
            latency_ms: 42,
            error: None,
        }
    }

    #[test]
    fn test_format_endpoints_table_empty() {
        let output = format_endpoints_table(&[]);
        assert!(output.contains("Endpoint")); // Header present
    }

    #[test]
    fn test_format_endpoints_table_with_data() {
        let output = format_endpoints_table(&[view()]);
        assert!(output.contains("http://127.0.0.1:11434"));
        assert!(output.contains("Working"));
        assert!(output.contains("42ms"));
    }

    #[test]
    fn test_format_endpoints_json_valid() {
        let output = format_endpoints_json(&[view()]);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(parsed.get("endpoints").is_some());
    }

    #[test]
    fn test_view_from_test_result() {
        let result = EndpointTestResult {
            endpoint: "http://localhost:8080".to_string(),
            is_working: false,
            response_time_ms: 3000,
            models_available: vec![],
            protocol: None,
            error: Some("connection refused".to_string()),
            checked_at: Utc::now(),
        };
        let view = EndpointView::from(&result);
        assert!(!view.working);
        assert_eq!(view.error.as_deref(), Some("connection refused"));
    }

    #[test]
    fn test_status_icon() {
        assert_eq!(status_icon(true), "✓");
        assert_eq!(status_icon(false), "✗");
    }
}
