//! Cache tier selection.
//!
//! The tier is a pure function of the query's date span, evaluated before key
//! generation. Boundary spans (exactly 1, 7, 30 days) belong to the shorter-TTL
//! tier.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Cache-TTL class selected by query date-span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Realtime,
    Daily,
    Weekly,
    Monthly,
}

impl Tier {
    /// Selects the tier for a span of whole days, inclusive of endpoints.
    pub fn for_span_days(days: i64) -> Self {
        if days <= 1 {
            Self::Realtime
        } else if days <= 7 {
            Self::Daily
        } else if days <= 30 {
            Self::Weekly
        } else {
            Self::Monthly
        }
    }

    /// Time-to-live for entries in this tier.
    ///
    /// Realtime is short because the window may still be accumulating events;
    /// longer spans are pure functions of an immutable range and can live
    /// longer.
    pub fn ttl(&self) -> Duration {
        match self {
            Self::Realtime => Duration::from_secs(300),
            Self::Daily => Duration::from_secs(3_600),
            Self::Weekly => Duration::from_secs(21_600),
            Self::Monthly => Duration::from_secs(86_400),
        }
    }

    /// Trend-bucket width for this tier, so trend points align with cache
    /// boundaries.
    pub fn bucket_seconds(&self) -> i64 {
        match self {
            Self::Realtime => 3_600,
            Self::Daily | Self::Weekly => 86_400,
            Self::Monthly => 604_800,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Realtime => "realtime",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
