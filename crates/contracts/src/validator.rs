//! SchemaValidator trait - validation gate collaborator

use crate::{TopicName, ValidationError};

/// Validates a raw payload against the schema registered for its topic
///
/// Implementations must distinguish a missing schema
/// (`ValidationError::SchemaNotFound`) from a non-conforming payload; both
/// reject the envelope.
pub trait SchemaValidator: Send + Sync {
    fn validate(&self, topic: &TopicName, payload: &[u8]) -> Result<(), ValidationError>;
}
