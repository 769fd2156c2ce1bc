//! # Ingress
//!
//! Inbound adapters feeding the dispatch router.
//!
//! Responsibilities:
//! - Decode inbound messages into `Envelope`s
//! - Call `TopicHandler::handle` identically from every adapter
//! - Translate the `Outcome` into the adapter's own terms (HTTP status,
//!   bus ack/drop/redeliver)
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{rest_router, BusIngress, FailurePolicy};
//!
//! let handler = Arc::new(router);
//! let app = rest_router(Arc::clone(&handler), identity, metrics.clone());
//! let ingress = BusIngress::new(handler, bus.subscribe(topics), FailurePolicy::Drop);
//! let task = ingress.spawn(shutdown_signal());
//! ```

mod bus_ingress;
mod config;
mod error;
mod rest;

pub use bus_ingress::{BusIngress, DEFAULT_DRAIN_TIMEOUT};
pub use config::{FailurePolicy, IngressMetrics, IngressSnapshot};
pub use error::{IngestionError, Result};
pub use rest::{rest_router, serve, status_for, OutcomeBody};
