//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
///
/// Only raised while wiring the router. Per-envelope failures are reported
/// as `Outcome`s, never as errors.
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Registry built without any route
    #[error("transport registry is empty, at least one route is required")]
    EmptyRegistry,

    /// Executor creation error
    #[error("failed to create {kind} executor: {message}")]
    ExecutorCreation { kind: &'static str, message: String },
}

impl DispatcherError {
    /// Create an executor creation error
    pub fn executor_creation(kind: &'static str, message: impl Into<String>) -> Self {
        Self::ExecutorCreation {
            kind,
            message: message.into(),
        }
    }
}
