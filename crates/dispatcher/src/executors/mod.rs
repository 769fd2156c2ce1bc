//! Delivery executors
//!
//! Contains HttpCallExecutor and BusPublishExecutor.

mod bus;
mod http;

pub use self::bus::BusPublishExecutor;
pub use self::http::HttpCallExecutor;
