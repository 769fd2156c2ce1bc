//! DispatchRouter - resolve, validate, deliver, report

use std::sync::Arc;
use std::time::Instant;

use contracts::{
    CallExecutor, Delivery, Envelope, Outcome, PublishExecutor, RouteEntry, SchemaValidator,
    TopicHandler, TransportKind,
};
use tracing::{error, info, instrument, warn};

use crate::metrics::DispatchMetrics;
use crate::registry::TransportRegistry;

/// Routes envelopes to the transport bound to their topic
///
/// Stateless per request: the registry is immutable and the executors are
/// shared, so any number of `handle` calls may run concurrently.
pub struct DispatchRouter<V, C, P> {
    registry: TransportRegistry,
    validator: V,
    call_executor: C,
    publish_executor: P,
    metrics: Arc<DispatchMetrics>,
}

impl<V, C, P> DispatchRouter<V, C, P> {
    pub fn new(registry: TransportRegistry, validator: V, call_executor: C, publish_executor: P) -> Self {
        Self {
            registry,
            validator,
            call_executor,
            publish_executor,
            metrics: Arc::new(DispatchMetrics::new()),
        }
    }

    pub fn registry(&self) -> &TransportRegistry {
        &self.registry
    }

    pub fn metrics(&self) -> Arc<DispatchMetrics> {
        Arc::clone(&self.metrics)
    }

    fn report(
        &self,
        topic: &str,
        outcome: &Outcome,
        route: Option<&RouteEntry>,
        latency_ms: Option<u64>,
    ) {
        self.metrics.record(outcome);
        observability::record_dispatch_outcome(metric_topic(topic, route), outcome.kind());
        let transport = route.map(|r| r.transport.as_str()).unwrap_or("none");
        let destination = route.map(|r| r.destination.as_str()).unwrap_or("");

        match outcome {
            Outcome::Delivered(delivery) => {
                let latency_ms = latency_ms.unwrap_or(0);
                self.metrics.add_latency_ms(latency_ms);
                observability::record_delivery_latency_ms(transport, latency_ms as f64);
                info!(transport, destination, %delivery, latency_ms, "Delivered");
            }
            Outcome::Rejected(err) => {
                error!(transport, destination, error = %err, "Rejected");
            }
            Outcome::Unsupported(_) => {
                warn!(topic, "Non-supported topic");
            }
            Outcome::Failed(err) => {
                error!(transport, destination, error = %err, "Delivery failed");
            }
        }
    }
}

/// Metric label for a topic; unrouted names collapse into one label
fn metric_topic<'a>(topic: &'a str, route: Option<&RouteEntry>) -> &'a str {
    match route {
        Some(_) => topic,
        None => observability::UNROUTED_TOPIC_LABEL,
    }
}

impl<V, C, P> TopicHandler for DispatchRouter<V, C, P>
where
    V: SchemaValidator,
    C: CallExecutor + Sync,
    P: PublishExecutor + Sync,
{
    #[instrument(
        name = "dispatch",
        skip(self, envelope),
        fields(topic = %envelope.topic, bytes = envelope.payload.len())
    )]
    async fn handle(&self, envelope: Envelope) -> Outcome {
        let Envelope { topic, payload } = envelope;

        let Some(route) = self.registry.resolve(&topic) else {
            let outcome = Outcome::Unsupported(topic.clone());
            self.report(&topic, &outcome, None, None);
            return outcome;
        };

        if let Err(err) = self.validator.validate(&topic, &payload) {
            let outcome = Outcome::Rejected(err);
            self.report(&topic, &outcome, Some(route), None);
            return outcome;
        }

        let started = Instant::now();
        let delivered = match route.transport {
            TransportKind::SyncCall => self
                .call_executor
                .call(&route.destination, payload)
                .await
                .map(Delivery::Status),
            TransportKind::AsyncPublish => self
                .publish_executor
                .publish(&route.destination, payload)
                .await
                .map(|()| Delivery::Ack),
        };
        let latency_ms = started.elapsed().as_millis() as u64;

        let outcome = match delivered {
            Ok(delivery) => Outcome::Delivered(delivery),
            Err(err) => Outcome::Failed(err),
        };
        self.report(&topic, &outcome, Some(route), Some(latency_ms));
        outcome
    }
}
