//! Dispatch seams
//!
//! `TopicHandler` is what ingress adapters call; `CallExecutor` and
//! `PublishExecutor` are the two delivery strategies the router selects from.

use bytes::Bytes;

use crate::{Envelope, Outcome, TransportError};

/// Single entry point of the dispatch core
///
/// Adapters decode their inbound messages into envelopes and call `handle`
/// identically; the handler does not know which adapter invoked it.
#[trait_variant::make(TopicHandler: Send)]
pub trait LocalTopicHandler {
    /// Handle one envelope and produce exactly one outcome
    async fn handle(&self, envelope: Envelope) -> Outcome;
}

/// Synchronous call delivery
#[trait_variant::make(CallExecutor: Send)]
pub trait LocalCallExecutor {
    /// Send `payload` to `destination` and return the 2xx status code
    ///
    /// # Errors
    /// Non-2xx answers, connection failures and timeouts are all reported as
    /// `TransportError`. Implementations must bound the wait.
    async fn call(&self, destination: &str, payload: Bytes) -> Result<u16, TransportError>;
}

/// Asynchronous publish delivery
#[trait_variant::make(PublishExecutor: Send)]
pub trait LocalPublishExecutor {
    /// Hand `payload` to the bus topic exactly once
    async fn publish(&self, bus_topic: &str, payload: Bytes) -> Result<(), TransportError>;
}
