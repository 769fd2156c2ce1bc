//! Route entries - static topic bindings
//!
//! A route binds one topic to a transport kind and a destination.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TopicName;

/// Transport used to deliver a topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Synchronous request/response to an HTTP endpoint
    SyncCall,
    /// Fire-and-forget emission onto a bus topic
    AsyncPublish,
}

impl TransportKind {
    /// Stable label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SyncCall => "sync_call",
            Self::AsyncPublish => "async_publish",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static binding of a topic to its transport and destination
///
/// `destination` is a URL for `SyncCall` and a bus topic name for
/// `AsyncPublish`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub topic: TopicName,
    pub transport: TransportKind,
    pub destination: String,
}

impl RouteEntry {
    pub fn new(
        topic: impl Into<TopicName>,
        transport: TransportKind,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            transport,
            destination: destination.into(),
        }
    }
}
