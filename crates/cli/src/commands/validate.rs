//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{GatewayBlueprint, TransportKind};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

use super::load_blueprint;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    service: String,
    listen_addr: String,
    route_count: usize,
    sync_call_count: usize,
    async_publish_count: usize,
    consumed_topics: Vec<String>,
    schema_dir: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let loaded = load_blueprint(&args.config);

    if args.resolved {
        let blueprint = loaded.context("Configuration validation failed")?;
        let toml = config_loader::ConfigLoader::to_toml(&blueprint)
            .context("Failed to serialize resolved configuration")?;
        println!("{toml}");
        return Ok(());
    }

    let config_path = args.config.display().to_string();
    let result = match loaded {
        Ok(blueprint) => ValidationResult {
            valid: true,
            config_path,
            error: None,
            warnings: collect_warnings(&blueprint),
            summary: Some(summarize(&blueprint)),
        },
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: Vec::new(),
            summary: None,
        },
    };

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{json}");
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn summarize(blueprint: &GatewayBlueprint) -> ConfigSummary {
    let count = |kind: TransportKind| {
        blueprint
            .routes
            .iter()
            .filter(|route| route.transport == kind)
            .count()
    };

    ConfigSummary {
        version: format!("{:?}", blueprint.version),
        service: blueprint.service.name.clone(),
        listen_addr: blueprint.service.listen_addr.clone(),
        route_count: blueprint.routes.len(),
        sync_call_count: count(TransportKind::SyncCall),
        async_publish_count: count(TransportKind::AsyncPublish),
        consumed_topics: blueprint
            .consumed_topics()
            .iter()
            .map(ToString::to_string)
            .collect(),
        schema_dir: blueprint.schema.dir.display().to_string(),
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &GatewayBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    for topic in config_loader::duplicate_route_topics(blueprint) {
        warnings.push(format!(
            "Topic '{topic}' is routed more than once, the last entry wins"
        ));
    }

    if blueprint.schema.dir.is_dir() {
        for route in &blueprint.routes {
            let path = blueprint.schema.dir.join(format!("{}.json", route.topic));
            if !path.is_file() {
                warnings.push(format!(
                    "No schema for topic '{}' at {}, its messages will be rejected",
                    route.topic,
                    path.display()
                ));
            }
        }
    } else {
        warnings.push(format!(
            "Schema directory {} does not exist",
            blueprint.schema.dir.display()
        ));
    }

    if blueprint.bus.consume_topics.is_empty() {
        warnings.push("bus.consume_topics is empty - consuming all sync_call topics".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Service: {} ({})", summary.service, summary.listen_addr);
            println!(
                "  Routes: {} ({} sync_call, {} async_publish)",
                summary.route_count, summary.sync_call_count, summary.async_publish_count
            );
            println!("  Consumed topics: {}", summary.consumed_topics.join(", "));
            println!("  Schemas: {}", summary.schema_dir);
        }

        if !result.warnings.is_empty() {
            println!("\n⚠ Warnings:");
            for warning in &result.warnings {
                println!("  - {warning}");
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {error}");
        }
    }
}
