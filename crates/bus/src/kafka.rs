//! KafkaBus - broker-backed bus
//!
//! The delivery attempt travels in the `x-attempt` header. A nack republishes
//! the message with the next attempt; the original offset is committed when
//! the message is handed out, so the broker never replays it on its own.

use std::time::Duration;

use bytes::Bytes;
use contracts::{BusConsumer, BusMessage, BusPublisher, ContractError, KafkaConfig};
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::{BorrowedMessage, Header, Headers, Message, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use tracing::{debug, error, info, instrument, warn};

/// Header carrying `BusMessage::attempt`
pub const ATTEMPT_HEADER: &str = "x-attempt";

fn producer_config(config: &KafkaConfig) -> ClientConfig {
    let mut client = ClientConfig::new();
    client.set("bootstrap.servers", &config.bootstrap_servers);
    client.set("message.timeout.ms", config.message_timeout_ms.to_string());
    client.set("acks", "all");
    client.set("enable.idempotence", "true");
    apply_security(config, &mut client);
    client
}

fn consumer_config(config: &KafkaConfig) -> ClientConfig {
    let mut client = ClientConfig::new();
    client.set("bootstrap.servers", &config.bootstrap_servers);
    client.set("group.id", &config.group_id);
    client.set("enable.auto.commit", "false");
    client.set("auto.offset.reset", "earliest");
    apply_security(config, &mut client);
    client
}

fn apply_security(config: &KafkaConfig, client: &mut ClientConfig) {
    if let Some(protocol) = &config.security_protocol {
        client.set("security.protocol", protocol);
    }
    if let Some(mechanism) = &config.sasl_mechanism {
        client.set("sasl.mechanism", mechanism);
    }
    if let Some(username) = &config.sasl_username {
        client.set("sasl.username", username);
    }
    if let Some(password) = &config.sasl_password {
        client.set("sasl.password", password);
    }
}

/// Missing or malformed headers count as the first attempt
fn parse_attempt(value: Option<&[u8]>) -> u32 {
    value
        .and_then(|v| std::str::from_utf8(v).ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

fn to_bus_message(message: &BorrowedMessage<'_>) -> Option<BusMessage> {
    let payload = message.payload()?;
    let attempt = message
        .headers()
        .and_then(|headers| headers.iter().find(|h| h.key == ATTEMPT_HEADER))
        .and_then(|h| h.value);

    Some(BusMessage {
        topic: message.topic().to_string(),
        value: Bytes::copy_from_slice(payload),
        attempt: parse_attempt(attempt),
    })
}

async fn send(
    producer: &FutureProducer,
    timeout: Duration,
    message: &BusMessage,
) -> Result<(), ContractError> {
    let attempt = message.attempt.to_string();
    let headers = OwnedHeaders::new().insert(Header {
        key: ATTEMPT_HEADER,
        value: Some(attempt.as_str()),
    });
    let record = FutureRecord::<(), [u8]>::to(&message.topic)
        .payload(&message.value[..])
        .headers(headers);

    let (partition, offset) = producer
        .send(record, timeout)
        .await
        .map_err(|(e, _)| ContractError::bus_publish(&message.topic, e.to_string()))?;
    debug!(partition, offset, "Published");
    Ok(())
}

/// Kafka producer; clones share the same client
#[derive(Clone)]
pub struct KafkaBus {
    producer: FutureProducer,
    config: KafkaConfig,
}

impl KafkaBus {
    /// Create the producer
    ///
    /// librdkafka connects lazily, so an unreachable broker surfaces as
    /// publish errors rather than here.
    pub fn new(config: &KafkaConfig) -> Result<Self, ContractError> {
        let producer: FutureProducer = producer_config(config).create().map_err(|e| {
            ContractError::bus_connection(format!("failed to create Kafka producer: {e}"))
        })?;

        info!(bootstrap_servers = %config.bootstrap_servers, "Kafka producer created");
        Ok(Self {
            producer,
            config: config.clone(),
        })
    }

    /// Join the consumer group on a set of topics
    pub fn subscribe<I, T>(&self, topics: I) -> Result<KafkaSubscription, ContractError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let consumer: StreamConsumer = consumer_config(&self.config).create().map_err(|e| {
            ContractError::bus_connection(format!("failed to create Kafka consumer: {e}"))
        })?;

        let topics: Vec<String> = topics.into_iter().map(Into::into).collect();
        let topic_refs: Vec<&str> = topics.iter().map(String::as_str).collect();
        consumer.subscribe(&topic_refs).map_err(|e| {
            ContractError::bus_connection(format!("failed to subscribe to {topics:?}: {e}"))
        })?;

        info!(?topics, group_id = %self.config.group_id, "Subscribed to Kafka topics");
        Ok(KafkaSubscription {
            consumer,
            producer: self.producer.clone(),
            timeout: self.config.message_timeout(),
        })
    }
}

impl BusPublisher for KafkaBus {
    #[instrument(
        name = "kafka_bus_publish",
        skip(self, message),
        fields(topic = %message.topic, attempt = message.attempt)
    )]
    async fn publish(&self, message: BusMessage) -> Result<(), ContractError> {
        send(&self.producer, self.config.message_timeout(), &message).await
    }
}

/// Consumer-group member
///
/// `next` never yields `None`; the stream only ends with the process.
pub struct KafkaSubscription {
    consumer: StreamConsumer,
    producer: FutureProducer,
    timeout: Duration,
}

impl BusConsumer for KafkaSubscription {
    async fn next(&mut self) -> Option<BusMessage> {
        loop {
            match self.consumer.recv().await {
                Ok(message) => {
                    let bus_message = to_bus_message(&message);
                    if let Err(e) = self.consumer.commit_message(&message, CommitMode::Async) {
                        error!(error = %e, "Failed to commit offset");
                    }
                    match bus_message {
                        Some(bus_message) => return Some(bus_message),
                        None => warn!(topic = message.topic(), "Message without payload skipped"),
                    }
                }
                Err(e) => error!(error = %e, "Kafka consumer error"),
            }
        }
    }

    #[instrument(
        name = "kafka_bus_nack",
        skip(self, message),
        fields(topic = %message.topic, attempt = message.attempt)
    )]
    async fn nack(&self, mut message: BusMessage) -> Result<(), ContractError> {
        message.attempt += 1;
        send(&self.producer, self.timeout, &message).await
    }
}
