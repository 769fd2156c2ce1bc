//! # Bus
//!
//! Publish/subscribe buses behind the `BusPublisher`/`BusConsumer` traits.
//!
//! - `ChannelBus`: in-process, built on tokio broadcast channels. Every
//!   subscriber sees every message and filters by its own topic set.
//!   Publishing with no subscribers succeeds and the message is discarded,
//!   the same as a broker topic nobody consumes.
//! - `KafkaBus` (feature `kafka`): bus topics are Kafka topics, ingress
//!   subscriptions join one consumer group.

mod channel;
#[cfg(feature = "kafka")]
mod kafka;

pub use channel::{ChannelBus, ChannelSubscription};
#[cfg(feature = "kafka")]
pub use kafka::{KafkaBus, KafkaSubscription, ATTEMPT_HEADER};
