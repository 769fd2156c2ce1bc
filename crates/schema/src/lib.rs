//! # Schema
//!
//! Topic schema validation, the gate in front of every delivery.
//!
//! Responsibilities:
//! - Map topic names to schema resource paths (`<dir>/<TopicName>.json`)
//! - Load all schemas once at startup (immutable afterwards)
//! - Validate raw payloads structurally against a JSON-Schema subset
//!
//! A topic without a schema resource is rejected, never passed through.

mod error;
mod keywords;
mod store;

pub use error::SchemaError;
pub use store::{JsonSchemaValidator, SchemaStore};
