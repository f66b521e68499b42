//! Deterministic cache key generation.
//!
//! Keys are `analytics:{kind}:{tier}:{hash}` where the hash covers the full
//! filter set, so any two requests with identical filters share an entry and
//! any difference produces a disjoint one.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use engine_core::EventFilter;

use crate::Tier;

/// Query kind, namespacing entries per endpoint family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Metrics,
    AdvancedMetrics,
    Funnel,
    Journey,
    Elements,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metrics => "metrics",
            Self::AdvancedMetrics => "metrics_advanced",
            Self::Funnel => "funnel",
            Self::Journey => "journey",
            Self::Elements => "elements",
        }
    }
}

/// Generates the cache key for a filter set under a tier.
///
/// `extra` carries endpoint-specific discriminants that are not part of the
/// store filter (journey identifier type, element device class).
pub fn generate_key(kind: QueryKind, filter: &EventFilter, tier: Tier, extra: &[&str]) -> String {
    let mut hasher = DefaultHasher::new();
    filter.start.hash(&mut hasher);
    filter.end.hash(&mut hasher);
    filter.session_hash.hash(&mut hasher);
    filter.visitor_hash.hash(&mut hasher);
    filter.user_id.hash(&mut hasher);
    filter.event_type.map(|t| t.as_str()).hash(&mut hasher);
    filter.page.hash(&mut hasher);
    for part in extra {
        part.hash(&mut hasher);
    }
    format!(
        "analytics:{}:{}:{:016x}",
        kind.as_str(),
        tier,
        hasher.finish()
    )
}
