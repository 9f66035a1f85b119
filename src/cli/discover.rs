//! Discover command handler

use super::output::{format_endpoints_json, format_endpoints_table, EndpointView};
use super::DiscoverArgs;
use crate::connector::Connector;
use crate::discovery::DiscoverOptions;
use crate::events::ConnectorEvent;
use anyhow::Context;

/// Handle `scribelink discover`
pub async fn handle_discover(args: &DiscoverArgs, connector: &Connector) -> anyhow::Result<String> {
    let options = DiscoverOptions {
        max_concurrent: args
            .max_concurrent
            .unwrap_or(connector.config().discovery.max_concurrent),
        quick_test_first: !args.no_quick,
    };

    // Render progress to stderr while discovery runs
    let mut events = connector.subscribe();
    let progress = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let ConnectorEvent::DiscoveryProgress {
                current,
                total,
                message,
                ..
            } = event
            {
                eprintln!("  [{}/{}] {}", current, total, message);
            }
        }
    });

    let result = connector.discover_with(&options).await;
    progress.abort();

    let endpoint = result.context(
        "No inference server was found. Check that one is running and reachable, then retry",
    )?;

    let views: Vec<EndpointView> = connector
        .endpoint_reports()
        .iter()
        .filter(|r| r.is_working)
        .map(EndpointView::from)
        .collect();

    if args.json {
        Ok(format_endpoints_json(&views))
    } else {
        Ok(format!(
            "✓ Connected to {}\n\n{}",
            endpoint,
            format_endpoints_table(&views)
        ))
    }
}
