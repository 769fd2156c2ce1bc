//! Layered error definitions
//!
//! Categorized by source: config / envelope / bus.
//! Dispatch-time failures are not errors here; they are `Outcome` variants.

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Ingress Errors =====
    /// Inbound document could not be turned into an envelope
    #[error("envelope decode error: {message}")]
    EnvelopeDecode { message: String },

    // ===== Bus Errors =====
    /// Bus publish error
    #[error("bus publish to '{topic}' failed: {message}")]
    BusPublish { topic: String, message: String },

    /// Bus client could not be created or subscribed
    #[error("bus connection error: {message}")]
    BusConnection { message: String },

    /// Bus is closed
    #[error("bus closed")]
    BusClosed,

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create envelope decode error
    pub fn envelope_decode(message: impl Into<String>) -> Self {
        Self::EnvelopeDecode {
            message: message.into(),
        }
    }

    /// Create bus publish error
    pub fn bus_publish(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BusPublish {
            topic: topic.into(),
            message: message.into(),
        }
    }

    /// Create bus connection error
    pub fn bus_connection(message: impl Into<String>) -> Self {
        Self::BusConnection {
            message: message.into(),
        }
    }
}
