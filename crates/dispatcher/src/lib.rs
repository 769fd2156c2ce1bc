//! # Dispatcher
//!
//! Topic dispatch core.
//!
//! Responsibilities:
//! - Resolve a topic against the static `TransportRegistry`
//! - Gate the payload through the schema validator
//! - Deliver through the sync call or async publish executor
//! - Report exactly one `Outcome` per envelope

pub mod error;
pub mod executors;
pub mod metrics;
pub mod registry;
pub mod router;

pub use contracts::{Outcome, TopicHandler};
pub use error::DispatcherError;
pub use executors::{BusPublishExecutor, HttpCallExecutor};
pub use metrics::{DispatchMetrics, DispatchSnapshot};
pub use registry::{RegistryBuilder, TransportRegistry};
pub use router::DispatchRouter;
