//! `routes` command implementation.

use anyhow::{Context, Result};
use dispatcher::TransportRegistry;
use serde::Serialize;
use tracing::info;

use crate::cli::RoutesArgs;

use super::load_blueprint;

#[derive(Serialize)]
struct RouteInfo {
    topic: String,
    transport: String,
    destination: String,
}

/// Execute the `routes` command
///
/// Prints the registry as the router sees it, with duplicates already
/// resolved.
pub fn run_routes(args: &RoutesArgs) -> Result<()> {
    let blueprint = load_blueprint(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    let registry = TransportRegistry::from_routes(&blueprint.routes)
        .context("Failed to build transport registry")?;

    info!(routes = registry.len(), "Routing table resolved");

    let routes: Vec<RouteInfo> = registry
        .routes()
        .into_iter()
        .map(|entry| RouteInfo {
            topic: entry.topic.to_string(),
            transport: entry.transport.to_string(),
            destination: entry.destination.clone(),
        })
        .collect();

    if args.json {
        let json =
            serde_json::to_string_pretty(&routes).context("Failed to serialize routes")?;
        println!("{json}");
        return Ok(());
    }

    let topic_width = routes.iter().map(|r| r.topic.len()).max().unwrap_or(5).max(5);
    println!("{:<topic_width$}  {:<13}  DESTINATION", "TOPIC", "TRANSPORT");
    for route in &routes {
        println!(
            "{:<topic_width$}  {:<13}  {}",
            route.topic, route.transport, route.destination
        );
    }
    Ok(())
}
