//! ChannelBus - broadcast-backed bus

use std::collections::HashSet;

use contracts::{BusConsumer, BusMessage, BusPublisher, ContractError};
use tokio::sync::broadcast;
use tracing::{debug, instrument, warn};

/// In-memory bus; clones share the same channel
#[derive(Debug, Clone)]
pub struct ChannelBus {
    sender: broadcast::Sender<BusMessage>,
}

impl ChannelBus {
    /// Create a bus whose subscribers buffer up to `capacity` messages
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to a set of topics
    ///
    /// Only messages published after this call are received.
    pub fn subscribe<I, T>(&self, topics: I) -> ChannelSubscription
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        ChannelSubscription {
            topics: topics.into_iter().map(Into::into).collect(),
            receiver: self.sender.subscribe(),
            sender: self.sender.downgrade(),
        }
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl BusPublisher for ChannelBus {
    #[instrument(
        name = "channel_bus_publish",
        skip(self, message),
        fields(topic = %message.topic, attempt = message.attempt)
    )]
    async fn publish(&self, message: BusMessage) -> Result<(), ContractError> {
        match self.sender.send(message) {
            Ok(receivers) => debug!(receivers, "Published"),
            Err(broadcast::error::SendError(message)) => {
                debug!(topic = %message.topic, "No subscribers, message discarded");
            }
        }
        Ok(())
    }
}

/// One consumer's view of the bus
///
/// Holds only a weak sender, so the subscription ends once every
/// `ChannelBus` handle is dropped.
pub struct ChannelSubscription {
    topics: HashSet<String>,
    receiver: broadcast::Receiver<BusMessage>,
    sender: broadcast::WeakSender<BusMessage>,
}

impl ChannelSubscription {
    pub fn topics(&self) -> &HashSet<String> {
        &self.topics
    }
}

impl BusConsumer for ChannelSubscription {
    async fn next(&mut self) -> Option<BusMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(message) if self.topics.contains(&message.topic) => return Some(message),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Subscriber lagged, messages skipped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Republish `message` with `attempt + 1`
    ///
    /// The redelivery goes back on the shared channel, so every live
    /// subscription to the topic receives it, not only this one. Consumers
    /// sharing a topic must treat redeliveries as idempotent.
    #[instrument(
        name = "channel_bus_nack",
        skip(self, message),
        fields(topic = %message.topic, attempt = message.attempt)
    )]
    async fn nack(&self, mut message: BusMessage) -> Result<(), ContractError> {
        let sender = self.sender.upgrade().ok_or(ContractError::BusClosed)?;
        message.attempt += 1;
        let topic = message.topic.clone();
        sender
            .send(message)
            .map(|_| ())
            .map_err(|_| ContractError::bus_publish(topic, "no subscribers for redelivery"))
    }
}
