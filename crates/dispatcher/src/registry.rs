//! Transport registry - topic to route table
//!
//! Built once at startup through `RegistryBuilder` and never mutated
//! afterwards, so it can be shared across concurrent handlers without
//! synchronisation.

use std::collections::HashMap;

use contracts::{RouteConfig, RouteEntry, TopicName, TransportKind};
use tracing::{debug, instrument, warn};

use crate::error::DispatcherError;

/// Collects route registrations before the registry is frozen
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    routes: HashMap<TopicName, RouteEntry>,
    overrides: usize,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a topic; a later registration of the same topic replaces the
    /// earlier one
    pub fn register(
        &mut self,
        topic: impl Into<TopicName>,
        transport: TransportKind,
        destination: impl Into<String>,
    ) -> &mut Self {
        let entry = RouteEntry::new(topic, transport, destination);
        if let Some(previous) = self.routes.insert(entry.topic.clone(), entry) {
            self.overrides += 1;
            warn!(
                topic = %previous.topic,
                previous_transport = %previous.transport,
                previous_destination = %previous.destination,
                "Topic registered twice, last registration wins"
            );
        }
        self
    }

    /// Number of registrations that replaced an earlier one
    pub fn overrides(&self) -> usize {
        self.overrides
    }

    /// Freeze the table
    ///
    /// # Errors
    /// `DispatcherError::EmptyRegistry` when nothing was registered.
    pub fn build(self) -> Result<TransportRegistry, DispatcherError> {
        if self.routes.is_empty() {
            return Err(DispatcherError::EmptyRegistry);
        }
        observability::record_registry_routes(self.routes.len());
        debug!(
            routes = self.routes.len(),
            overrides = self.overrides,
            "Transport registry built"
        );
        Ok(TransportRegistry {
            routes: self.routes,
        })
    }
}

/// Immutable topic -> route table
#[derive(Debug, Clone)]
pub struct TransportRegistry {
    routes: HashMap<TopicName, RouteEntry>,
}

impl TransportRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Build from configured routes, in order
    #[instrument(name = "registry_from_routes", skip(routes), fields(count = routes.len()))]
    pub fn from_routes(routes: &[RouteConfig]) -> Result<Self, DispatcherError> {
        let mut builder = RegistryBuilder::new();
        for route in routes {
            builder.register(route.topic.clone(), route.transport, route.destination.clone());
        }
        builder.build()
    }

    /// Exact, case-sensitive lookup
    pub fn resolve(&self, topic: &str) -> Option<&RouteEntry> {
        self.routes.get(topic)
    }

    /// All entries sorted by topic
    pub fn routes(&self) -> Vec<&RouteEntry> {
        let mut entries: Vec<_> = self.routes.values().collect();
        entries.sort_by(|a, b| a.topic.cmp(&b.topic));
        entries
    }

    /// Topics bound to `transport`, sorted
    pub fn topics_for(&self, transport: TransportKind) -> Vec<TopicName> {
        let mut topics: Vec<_> = self
            .routes
            .values()
            .filter(|entry| entry.transport == transport)
            .map(|entry| entry.topic.clone())
            .collect();
        topics.sort();
        topics
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
