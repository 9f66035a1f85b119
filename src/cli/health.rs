//! Health command handler

use super::output::{format_endpoints_json, format_endpoints_table, EndpointView};
use super::HealthArgs;
use crate::connector::Connector;

/// Handle `scribelink health`: probe every known endpoint once and report.
pub async fn handle_health(args: &HealthArgs, connector: &Connector) -> anyhow::Result<String> {
    let known = connector.endpoint_history();
    if known.is_empty() {
        anyhow::bail!("No known endpoints yet. Run `scribelink discover` first");
    }

    let mut views = Vec::with_capacity(known.len());
    for endpoint in &known {
        let result = connector.probe_endpoint(endpoint).await;
        views.push(EndpointView::from(&result));
    }

    if args.json {
        Ok(format_endpoints_json(&views))
    } else {
        let healthy = views.iter().filter(|v| v.working).count();
        Ok(format!(
            "{}\n{} of {} known endpoints healthy",
            format_endpoints_table(&views),
            healthy,
            views.len()
        ))
    }
}
