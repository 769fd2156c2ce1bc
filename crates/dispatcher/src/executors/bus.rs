//! BusPublishExecutor - fire-and-forget hand-off to the bus

use bytes::Bytes;
use contracts::{BusMessage, BusPublisher, PublishExecutor, TransportError};
use tracing::{debug, instrument};

/// Executor that hands each payload to a `BusPublisher` exactly once
#[derive(Debug, Clone)]
pub struct BusPublishExecutor<B> {
    bus: B,
}

impl<B> BusPublishExecutor<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }
}

impl<B> PublishExecutor for BusPublishExecutor<B>
where
    B: BusPublisher + Sync,
{
    #[instrument(name = "bus_publish", skip(self, payload), fields(bytes = payload.len()))]
    async fn publish(&self, bus_topic: &str, payload: Bytes) -> Result<(), TransportError> {
        self.bus
            .publish(BusMessage::new(bus_topic, payload))
            .await
            .map_err(|e| TransportError::Publish {
                topic: bus_topic.to_string(),
                message: e.to_string(),
            })?;
        debug!("Handed off to bus");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::bus::ChannelBus;
    use contracts::{BusConsumer, ContractError};

    struct ClosedBus;

    impl BusPublisher for ClosedBus {
        async fn publish(&self, _message: BusMessage) -> Result<(), ContractError> {
            Err(ContractError::BusClosed)
        }
    }

    #[tokio::test]
    async fn test_publish_hands_off_once() {
        let bus = ChannelBus::new(8);
        let mut sub = bus.subscribe(["SeatResponse"]);
        let executor = BusPublishExecutor::new(bus.clone());

        executor
            .publish("SeatResponse", Bytes::from_static(br#"{"topicName":"SeatResponse"}"#))
            .await
            .unwrap();

        let message = sub.next().await.unwrap();
        assert_eq!(message.topic, "SeatResponse");
        assert_eq!(message.attempt, 0);
        assert_eq!(&message.value[..], br#"{"topicName":"SeatResponse"}"#);
    }

    #[tokio::test]
    async fn test_bus_error_maps_to_publish_failure() {
        let executor = BusPublishExecutor::new(ClosedBus);
        let err = executor
            .publish("LoginResponse", Bytes::from_static(b"{}"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Publish { ref topic, .. } if topic == "LoginResponse"));
    }
}
