//! Outcome - Dispatch router output
//!
//! The uniform tagged result of one dispatch attempt, plus the typed
//! rejection and transport failure details it carries.

use std::fmt;

use thiserror::Error;

use crate::TopicName;

/// How a delivered envelope was acknowledged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Synchronous call answered with a 2xx status
    Status(u16),
    /// Bus accepted the hand-off
    Ack,
}

impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "status {code}"),
            Self::Ack => f.write_str("ack"),
        }
    }
}

/// Payload could not be validated, or failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No schema resource exists for the topic
    #[error("no schema found for topic '{topic}' at '{path}'")]
    SchemaNotFound { topic: TopicName, path: String },

    /// Payload is not parseable JSON
    #[error("malformed payload for topic '{topic}': {message}")]
    MalformedPayload { topic: TopicName, message: String },

    /// Payload does not conform to the topic schema
    #[error("payload for topic '{topic}' failed schema validation: {}", .violations.join("; "))]
    Invalid {
        topic: TopicName,
        violations: Vec<String>,
    },
}

/// Delivery could not be completed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Downstream did not answer within the configured timeout
    #[error("request to '{destination}' timed out after {timeout_ms}ms")]
    Timeout { destination: String, timeout_ms: u64 },

    /// Connection could not be established or was broken
    #[error("destination '{destination}' unreachable: {message}")]
    Unreachable {
        destination: String,
        message: String,
    },

    /// Downstream answered with a non-2xx status
    #[error("destination '{destination}' answered with status {status}")]
    Status { destination: String, status: u16 },

    /// Bus refused the hand-off
    #[error("publish to bus topic '{topic}' failed: {message}")]
    Publish { topic: String, message: String },
}

/// Result of handling one envelope
///
/// Produced exactly once per envelope and never retried by the router.
/// The router never propagates a fault past its boundary; callers inspect
/// the tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Delivered(Delivery),
    Rejected(ValidationError),
    Unsupported(TopicName),
    Failed(TransportError),
}

impl Outcome {
    /// Stable label used in logs, metrics and ingress responses
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Delivered(_) => "delivered",
            Self::Rejected(_) => "rejected",
            Self::Unsupported(_) => "unsupported",
            Self::Failed(_) => "failed",
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }

    /// Human readable detail for logs and response bodies
    pub fn detail(&self) -> String {
        match self {
            Self::Delivered(delivery) => delivery.to_string(),
            Self::Rejected(err) => err.to_string(),
            Self::Unsupported(topic) => format!("non-supported topic: {topic}"),
            Self::Failed(err) => err.to_string(),
        }
    }
}
