//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// API Gateway - topic dispatch router
#[derive(Parser, Debug)]
#[command(
    name = "api-gateway",
    author,
    version,
    about = "Topic dispatch router for the ticketing API gateway",
    long_about = "Receives topic-tagged JSON messages over REST or the message bus,\n\
                  validates them against per-topic schemas and forwards them either\n\
                  synchronously to a downstream service or onto the bus."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "GATEWAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "GATEWAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the REST ingress and consume the bus
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Print the resolved routing table
    Routes(RoutesArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "gateway.toml", env = "GATEWAY_CONFIG")]
    pub config: PathBuf,

    /// Override REST listen address from configuration
    #[arg(long, env = "GATEWAY_LISTEN")]
    pub listen: Option<String>,

    /// Override schema directory from configuration
    #[arg(long, env = "GATEWAY_SCHEMA_DIR")]
    pub schema_dir: Option<PathBuf>,

    /// Override synchronous call timeout (ms) from configuration
    #[arg(long, env = "GATEWAY_REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: Option<u64>,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", env = "GATEWAY_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "gateway.toml", env = "GATEWAY_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the effective configuration (defaults filled in) as TOML
    #[arg(long, conflicts_with = "json")]
    pub resolved: bool,
}

/// Arguments for the `routes` command
#[derive(Parser, Debug)]
pub struct RoutesArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "gateway.toml", env = "GATEWAY_CONFIG")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
