//! # Contracts
//!
//! Frozen interface contracts shared by every gateway crate: the dispatch data
//! model, configuration blueprint, and the async seams between the router,
//! its collaborators and the ingress adapters.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Dispatch Model
//! - An `Envelope` (topic name + raw payload) is handled exactly once
//! - Every handled envelope yields exactly one `Outcome`
//! - Routes are static data (`RouteEntry`), never per-topic code

mod blueprint;
mod bus;
mod envelope;
mod error;
mod executor;
mod outcome;
mod route;
mod topic_name;
mod validator;

pub use blueprint::*;
pub use bus::{BusConsumer, BusMessage, BusPublisher, LocalBusConsumer, LocalBusPublisher};
pub use envelope::{Envelope, TOPIC_NAME_FIELD};
pub use error::*;
pub use executor::*;
pub use outcome::*;
pub use route::*;
pub use topic_name::TopicName;
pub use validator::SchemaValidator;
