//! Internal telemetry for the analytics engine: structured logging, query
//! path counters, and component health.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
