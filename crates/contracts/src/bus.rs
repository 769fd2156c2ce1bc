//! Bus traits - publish/subscribe collaborator
//!
//! Delivery and ordering guarantees belong to the bus implementation; these
//! traits only express "hand off once" and "consume, optionally redeliver".

use bytes::Bytes;

use crate::ContractError;

/// Message carried on the bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    /// Bus topic name
    pub topic: String,

    /// Message value (the original payload)
    pub value: Bytes,

    /// Delivery attempt, 0 for the first delivery
    pub attempt: u32,
}

impl BusMessage {
    pub fn new(topic: impl Into<String>, value: impl Into<Bytes>) -> Self {
        Self {
            topic: topic.into(),
            value: value.into(),
            attempt: 0,
        }
    }
}

/// Bus producer side
#[trait_variant::make(BusPublisher: Send)]
pub trait LocalBusPublisher {
    /// Emit one message onto its topic
    async fn publish(&self, message: BusMessage) -> Result<(), ContractError>;
}

/// Bus consumer side
#[trait_variant::make(BusConsumer: Send)]
pub trait LocalBusConsumer {
    /// Next message for this subscription, `None` once the bus is closed
    async fn next(&mut self) -> Option<BusMessage>;

    /// Negative-acknowledge a message so the bus redelivers it
    async fn nack(&self, message: BusMessage) -> Result<(), ContractError>;
}
