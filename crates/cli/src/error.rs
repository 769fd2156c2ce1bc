//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration could not be loaded or is invalid
    #[error("Failed to load configuration: {0}")]
    Config(#[from] contracts::ContractError),

    /// Schema directory could not be loaded
    #[error("Failed to load schemas: {0}")]
    Schema(#[from] schema::SchemaError),

    /// Router wiring error
    #[error("Failed to build dispatcher: {0}")]
    Dispatcher(#[from] dispatcher::DispatcherError),

    /// Ingress error
    #[error("Ingress failed: {0}")]
    Ingress(#[from] ingestion::IngestionError),

    /// Bus client could not be created
    #[cfg(feature = "kafka")]
    #[error("Bus unavailable: {0}")]
    Bus(contracts::ContractError),

    /// Configured bus backend was not compiled in
    #[cfg(not(feature = "kafka"))]
    #[error("Bus backend '{backend}' requires building with the '{feature}' feature")]
    BackendUnavailable {
        backend: &'static str,
        feature: &'static str,
    },

    /// Background task panicked or was cancelled
    #[error("Task '{name}' failed: {message}")]
    Task { name: &'static str, message: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    #[cfg(not(feature = "kafka"))]
    pub fn backend_unavailable(backend: contracts::BusBackend, feature: &'static str) -> Self {
        Self::BackendUnavailable {
            backend: backend.as_str(),
            feature,
        }
    }

    pub fn task(name: &'static str, message: impl Into<String>) -> Self {
        Self::Task {
            name,
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
