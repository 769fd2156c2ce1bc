//! Ingress error types

use thiserror::Error;

/// Ingress errors
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Listener could not be bound
    #[error("failed to bind REST listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// REST server stopped with an error
    #[error("REST server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Ingress Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
