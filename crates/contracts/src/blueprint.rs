//! GatewayBlueprint - Config Loader output
//!
//! Describes the complete gateway configuration: service identity, outbound
//! HTTP settings, schema location, bus settings and the routing table.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::{RouteEntry, TopicName, TransportKind};

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete gateway configuration blueprint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayBlueprint {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Service identity and listener
    #[serde(default)]
    pub service: ServiceConfig,

    /// Outbound HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Schema resource location
    #[serde(default)]
    pub schema: SchemaConfig,

    /// Bus settings
    #[serde(default)]
    pub bus: BusConfig,

    /// Routing table, one entry per supported topic
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

/// Service identity and REST listener
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name (logs)
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Identity string served on `GET /api/v1/name`
    #[serde(default = "default_identity")]
    pub identity: String,

    /// REST listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            identity: default_identity(),
            listen_addr: default_listen_addr(),
        }
    }
}

fn default_service_name() -> String {
    "api-gateway".to_string()
}

fn default_identity() -> String {
    "This microservice is the [API-GATEWAY]!".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

/// Outbound HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout (ms)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Connect timeout (ms)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_connect_timeout_ms() -> u64 {
    2000
}

/// Schema resource location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Directory holding `<TopicName>.json` schema files
    #[serde(default = "default_schema_dir")]
    pub dir: PathBuf,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            dir: default_schema_dir(),
        }
    }
}

fn default_schema_dir() -> PathBuf {
    PathBuf::from("schemas")
}

/// Bus settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    /// Bus implementation
    #[serde(default)]
    pub backend: BusBackend,

    /// Broker settings, used when `backend = "kafka"`
    #[serde(default)]
    pub kafka: KafkaConfig,

    /// In-process bus channel capacity
    #[serde(default = "default_bus_capacity")]
    pub capacity: usize,

    /// Topics consumed by the bus ingress (empty = every sync_call route)
    #[serde(default)]
    pub consume_topics: Vec<TopicName>,

    /// What the bus ingress does with failed deliveries
    #[serde(default)]
    pub failure_policy: FailurePolicyKind,

    /// Max delivery attempts under `redeliver`
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            backend: BusBackend::default(),
            kafka: KafkaConfig::default(),
            capacity: default_bus_capacity(),
            consume_topics: Vec::new(),
            failure_policy: FailurePolicyKind::default(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_bus_capacity() -> usize {
    1024
}

fn default_max_attempts() -> u32 {
    3
}

/// Bus implementation behind publish and ingress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusBackend {
    /// In-process broadcast channel; nothing outside the process sees it
    #[default]
    Channel,
    /// Kafka broker (requires the `kafka` feature)
    Kafka,
}

impl BusBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Channel => "channel",
            Self::Kafka => "kafka",
        }
    }
}

/// Kafka connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaConfig {
    /// Comma-separated bootstrap servers
    #[serde(default = "default_bootstrap_servers")]
    pub bootstrap_servers: String,

    /// Consumer group for bus ingress
    #[serde(default = "default_group_id")]
    pub group_id: String,

    /// Producer delivery timeout (ms)
    #[serde(default = "default_message_timeout_ms")]
    pub message_timeout_ms: u64,

    /// PLAINTEXT, SSL, SASL_PLAINTEXT or SASL_SSL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_protocol: Option<String>,

    /// PLAIN, SCRAM-SHA-256 or SCRAM-SHA-512
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sasl_mechanism: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sasl_username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sasl_password: Option<String>,
}

impl KafkaConfig {
    pub fn message_timeout(&self) -> Duration {
        Duration::from_millis(self.message_timeout_ms)
    }
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            bootstrap_servers: default_bootstrap_servers(),
            group_id: default_group_id(),
            message_timeout_ms: default_message_timeout_ms(),
            security_protocol: None,
            sasl_mechanism: None,
            sasl_username: None,
            sasl_password: None,
        }
    }
}

fn default_bootstrap_servers() -> String {
    "localhost:9092".to_string()
}

fn default_group_id() -> String {
    "api-gateway".to_string()
}

fn default_message_timeout_ms() -> u64 {
    5000
}

/// Failed-delivery handling for bus ingress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicyKind {
    /// Log and drop
    #[default]
    Drop,
    /// Negative-ack so the bus redelivers
    Redeliver,
}

/// One routing table entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    pub topic: TopicName,
    pub transport: TransportKind,
    pub destination: String,
}

impl From<&RouteConfig> for RouteEntry {
    fn from(route: &RouteConfig) -> Self {
        RouteEntry::new(route.topic.clone(), route.transport, route.destination.clone())
    }
}

impl GatewayBlueprint {
    /// Topics the bus ingress subscribes to
    ///
    /// Explicit `bus.consume_topics` win; otherwise every sync_call route is
    /// consumed (request-class topics arriving over the bus).
    pub fn consumed_topics(&self) -> Vec<TopicName> {
        if !self.bus.consume_topics.is_empty() {
            return self.bus.consume_topics.clone();
        }

        let mut topics: Vec<TopicName> = self
            .routes
            .iter()
            .filter(|route| route.transport == TransportKind::SyncCall)
            .map(|route| route.topic.clone())
            .collect();
        topics.sort();
        topics.dedup();
        topics
    }

    /// Route effective for `topic` (last entry wins)
    pub fn route_for(&self, topic: &str) -> Option<&RouteConfig> {
        self.routes.iter().rev().find(|route| route.topic == topic)
    }
}
