//! Aggregation and funnel analysis for the analytics engine.
//!
//! The calculators in this crate are deterministic pure functions over a
//! fetched event slice; `service` composes them with the event store and the
//! tiered result cache.

pub mod advanced;
pub mod comparison;
pub mod elements;
pub mod funnel;
pub mod journey;
pub mod metrics;
pub mod service;

pub use advanced::AdvancedMetrics;
pub use comparison::{percent_change, Comparison};
pub use elements::ElementReport;
pub use funnel::{FunnelAnalysis, FunnelAnalyzer, DEFAULT_STEPS};
pub use journey::{IdentifierType, Journey};
pub use metrics::AnalyticsMetrics;
pub use service::{AnalyticsService, MetricsOutcome, MetricsReport, MetricsRequest};
