//! `run` command implementation.

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::RunArgs;
use crate::gateway::Gateway;

use super::load_blueprint;

/// Execute the `run` command
pub async fn run_gateway(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    let mut blueprint = load_blueprint(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref listen) = args.listen {
        info!(listen = %listen, "Overriding listen address from CLI");
        blueprint.service.listen_addr = listen.clone();
    }
    if let Some(ref dir) = args.schema_dir {
        info!(dir = %dir.display(), "Overriding schema directory from CLI");
        blueprint.schema.dir = dir.clone();
    }
    if let Some(timeout_ms) = args.request_timeout_ms {
        info!(timeout_ms, "Overriding request timeout from CLI");
        blueprint.http.request_timeout_ms = timeout_ms;
    }
    config_loader::ConfigLoader::validate(&blueprint)
        .context("Configuration invalid after CLI overrides")?;

    info!(
        service = %blueprint.service.name,
        listen = %blueprint.service.listen_addr,
        routes = blueprint.routes.len(),
        schema_dir = %blueprint.schema.dir.display(),
        "Configuration loaded"
    );

    let stats = Gateway::new(blueprint)
        .run(shutdown_signal())
        .await
        .context("Gateway execution failed")?;

    info!("API gateway finished");
    stats.print_summary();

    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
