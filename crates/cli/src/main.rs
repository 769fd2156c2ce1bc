//! # API Gateway CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Configuration loading and validation
//! - Gateway wiring and lifecycle management
//! - Graceful shutdown handling

mod cli;
mod commands;
mod error;
mod gateway;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_gateway, run_routes, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_observability(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "API gateway CLI starting");

    let result = match &cli.command {
        Commands::Run(args) => run_gateway(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Routes(args) => run_routes(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging (and the metrics endpoint for `run`) from CLI options
fn init_observability(cli: &Cli) -> Result<()> {
    let metrics_port = match &cli.command {
        Commands::Run(args) if args.metrics_port != 0 => Some(args.metrics_port),
        _ => None,
    };

    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.clone().into(),
        metrics_port,
        default_log_level: ObservabilityConfig::level_for(cli.verbose, cli.quiet).to_string(),
        force_level: cli.quiet,
    })
}
