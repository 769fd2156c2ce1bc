//! Gateway metrics
//!
//! Thin wrappers over the `metrics` facade so metric names and labels stay
//! consistent across crates. Without an installed recorder these are no-ops.

use metrics::{counter, gauge, histogram};

/// Topic label for envelopes whose topic has no route
///
/// Unrouted topic names come from callers, so they never become label values.
pub const UNROUTED_TOPIC_LABEL: &str = "unsupported";

/// Record one dispatch outcome
///
/// `outcome` is the outcome kind label (`delivered`, `rejected`,
/// `unsupported`, `failed`). `topic` must be a routed topic or
/// [`UNROUTED_TOPIC_LABEL`].
pub fn record_dispatch_outcome(topic: &str, outcome: &'static str) {
    counter!(
        "api_gateway_dispatch_total",
        "topic" => topic.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record the latency of one successful delivery
pub fn record_delivery_latency_ms(transport: &'static str, latency_ms: f64) {
    histogram!("api_gateway_delivery_latency_ms", "transport" => transport).record(latency_ms);
}

/// Record an inbound message accepted by an ingress adapter
pub fn record_ingress(adapter: &'static str) {
    counter!("api_gateway_ingress_total", "adapter" => adapter).increment(1);
}

/// Record an inbound message an adapter could not decode
pub fn record_ingress_decode_failure(adapter: &'static str) {
    counter!("api_gateway_ingress_decode_failures_total", "adapter" => adapter).increment(1);
}

/// Record a bus redelivery request
pub fn record_redelivery(topic: &str) {
    counter!("api_gateway_bus_redeliveries_total", "topic" => topic.to_string()).increment(1);
}

/// Record the number of routes in the registry
pub fn record_registry_routes(routes: usize) {
    gauge!("api_gateway_registry_routes").set(routes as f64);
}
