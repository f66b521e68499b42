//! Query filters shared by every analytics endpoint.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, EventType, Result};

/// Inclusive date range for a query, resolved to whole UTC days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Parses `startDate`/`endDate` query values (`YYYY-MM-DD`).
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")
            .map_err(|_| Error::validation(format!("invalid startDate: {start}")))?;
        let end = NaiveDate::parse_from_str(end, "%Y-%m-%d")
            .map_err(|_| Error::validation(format!("invalid endDate: {end}")))?;
        if end < start {
            return Err(Error::validation("endDate precedes startDate"));
        }
        Ok(Self { start, end })
    }

    /// Span in whole days, inclusive of both endpoints. A single-day range
    /// has span 1.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Unix-second bounds covering the range: midnight at the start of the
    /// first day through the last second of the final day.
    pub fn to_bounds(&self) -> (i64, i64) {
        let start = self.start.and_hms_opt(0, 0, 0).expect("valid midnight");
        let end = self.end.and_hms_opt(23, 59, 59).expect("valid end of day");
        (start.and_utc().timestamp(), end.and_utc().timestamp())
    }

    /// The immediately preceding period of identical length:
    /// `prev_end = start - 1 day`, `prev_start = prev_end - (end - start)`.
    pub fn previous_period(&self) -> Self {
        let length = self.end - self.start;
        let prev_end = self.start - chrono::Duration::days(1);
        Self {
            start: prev_end - length,
            end: prev_end,
        }
    }
}

/// Filter set handed to the event store. Bounds are unix seconds, inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventFilter {
    pub start: i64,
    pub end: i64,
    pub session_hash: Option<i64>,
    pub visitor_hash: Option<String>,
    pub user_id: Option<String>,
    pub event_type: Option<EventType>,
    pub page: Option<String>,
}

impl EventFilter {
    /// Filter covering a date range with no identity constraints.
    pub fn for_range(range: &DateRange) -> Self {
        let (start, end) = range.to_bounds();
        Self {
            start,
            end,
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id.filter(|u| !u.is_empty());
        self
    }

    pub fn with_page(mut self, page: Option<String>) -> Self {
        self.page = page.filter(|p| !p.is_empty());
        self
    }
}
