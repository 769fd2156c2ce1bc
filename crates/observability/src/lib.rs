//! # Observability
//!
//! Tracing + Prometheus metrics for the gateway.
//!
//! ## Features
//!
//! - Tracing initialisation (JSON/Pretty/Compact), `RUST_LOG` aware
//! - Optional Prometheus exporter
//! - Dispatch, ingress and bus metric helpers
//!
//! ## Example
//!
//! ```ignore
//! observability::init_with_config(ObservabilityConfig::default())?;
//!
//! let outcome = router.handle(envelope).await;
//! observability::record_dispatch_outcome(&topic, outcome.kind());
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub use crate::metrics::{
    record_delivery_latency_ms, record_dispatch_outcome, record_ingress,
    record_ingress_decode_failure, record_redelivery, record_registry_routes, UNROUTED_TOPIC_LABEL,
};

/// Observability configuration
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Log format
    pub log_format: LogFormat,
    /// Prometheus port (None = disabled)
    pub metrics_port: Option<u16>,
    /// Filter used when RUST_LOG is unset
    pub default_log_level: String,
    /// Ignore RUST_LOG and force `default_log_level`
    pub force_level: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Json,
            metrics_port: None,
            default_log_level: "info".to_string(),
            force_level: false,
        }
    }
}

impl ObservabilityConfig {
    /// Level from `-v` count, `-q` wins
    pub fn level_for(verbose: u8, quiet: bool) -> &'static str {
        if quiet {
            return "warn";
        }
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    fn env_filter(&self) -> EnvFilter {
        if self.force_level {
            return EnvFilter::new(&self.default_log_level);
        }
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.default_log_level))
    }
}

/// Log format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON structured logs
    #[default]
    Json,
    /// Human readable
    Pretty,
    /// Compact single line
    Compact,
}

/// Install the global tracing subscriber and, if configured, the
/// Prometheus recorder
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    let fmt_layer = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    if let Some(port) = config.metrics_port {
        PrometheusBuilder::new()
            .with_http_listener(([0, 0, 0, 0], port))
            .install()
            .context("Failed to install Prometheus recorder")?;

        tracing::info!(port, "Prometheus metrics endpoint initialized");
    }

    tracing::info!(
        log_format = ?config.log_format,
        metrics_port = ?config.metrics_port,
        "Observability initialized"
    );

    Ok(())
}
