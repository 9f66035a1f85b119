//! Models command handler

use super::output::format_models_table;
use super::ModelsArgs;
use crate::connector::Connector;
use serde_json::json;

/// Handle `scribelink models`: list models on one endpoint.
pub async fn handle_models(args: &ModelsArgs, connector: &Connector) -> anyhow::Result<String> {
    let endpoint = match &args.endpoint {
        Some(endpoint) => endpoint.clone(),
        None => connector
            .endpoint_history()
            .into_iter()
            .next()
            .ok_or_else(|| {
                anyhow::anyhow!("No known endpoints yet. Run `scribelink discover` first")
            })?,
    };

    let result = connector.probe_endpoint(&endpoint).await;
    if !result.is_working {
        anyhow::bail!(
            "Endpoint {} is not responding: {}",
            endpoint,
            result.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }

    let protocol = result.protocol.map(|p| p.to_string());

    if args.json {
        Ok(serde_json::to_string_pretty(&json!({
            "endpoint": endpoint,
            "protocol": protocol,
            "models": result.models_available,
        }))?)
    } else {
        Ok(format_models_table(
            &endpoint,
            protocol.as_deref(),
            &result.models_available,
        ))
    }
}
