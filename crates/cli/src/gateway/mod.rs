//! Gateway orchestration.

mod orchestrator;
mod stats;

pub use orchestrator::Gateway;
pub use stats::GatewayStats;
