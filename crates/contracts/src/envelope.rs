//! Envelope - Ingress output
//!
//! The inbound unit of work: topic name plus the untouched raw payload.

use bytes::Bytes;
use serde_json::Value;

use crate::{ContractError, TopicName};

/// JSON field carrying the topic name in every inbound document
pub const TOPIC_NAME_FIELD: &str = "topicName";

/// Inbound unit of work
///
/// Immutable once received. The payload is kept as raw bytes so that it is
/// forwarded exactly as it arrived; only the topic name is extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Topic name, key into the transport registry
    pub topic: TopicName,

    /// Raw payload (zero-copy)
    pub payload: Bytes,
}

impl Envelope {
    /// Create an envelope from an already known topic and payload
    pub fn new(topic: impl Into<TopicName>, payload: impl Into<Bytes>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    /// Decode a raw inbound document into an envelope
    ///
    /// The document must be a JSON object with a string `topicName` field.
    /// The whole document becomes the payload.
    ///
    /// # Errors
    /// Returns `ContractError::EnvelopeDecode` for non-JSON input, non-object
    /// documents, and missing or non-string `topicName`.
    pub fn decode(raw: impl Into<Bytes>) -> Result<Self, ContractError> {
        let payload = raw.into();
        let document: Value = serde_json::from_slice(&payload)
            .map_err(|e| ContractError::envelope_decode(format!("payload is not JSON: {e}")))?;

        let object = document
            .as_object()
            .ok_or_else(|| ContractError::envelope_decode("payload is not a JSON object"))?;

        let topic = match object.get(TOPIC_NAME_FIELD) {
            Some(Value::String(name)) if !name.is_empty() => TopicName::from(name.as_str()),
            Some(Value::String(_)) => {
                return Err(ContractError::envelope_decode("'topicName' is empty"))
            }
            Some(_) => return Err(ContractError::envelope_decode("'topicName' is not a string")),
            None => return Err(ContractError::envelope_decode("missing 'topicName' field")),
        };

        Ok(Self { topic, payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_keeps_raw_payload() {
        let raw = r#"{"topicName":"LoginRequest","username":"ana","password":"pw"}"#;
        let envelope = Envelope::decode(raw.as_bytes().to_vec()).unwrap();
        assert_eq!(envelope.topic, "LoginRequest");
        assert_eq!(envelope.payload, Bytes::from(raw));
    }

    #[test]
    fn test_decode_missing_topic_name() {
        let err = Envelope::decode(r#"{"username":"ana"}"#.as_bytes().to_vec()).unwrap_err();
        assert!(err.to_string().contains("missing 'topicName'"), "got: {err}");
    }

    #[test]
    fn test_decode_rejects_non_object() {
        let err = Envelope::decode(b"[1,2,3]".to_vec()).unwrap_err();
        assert!(matches!(err, ContractError::EnvelopeDecode { .. }));
    }

    #[test]
    fn test_decode_rejects_non_json() {
        let err = Envelope::decode(b"topicName=LoginRequest".to_vec()).unwrap_err();
        assert!(err.to_string().contains("not JSON"), "got: {err}");
    }

    #[test]
    fn test_decode_rejects_numeric_topic() {
        let err = Envelope::decode(br#"{"topicName":42}"#.to_vec()).unwrap_err();
        assert!(err.to_string().contains("not a string"), "got: {err}");
    }
}
