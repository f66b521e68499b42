//! Per-visitor journey reconstruction.
//!
//! Given one identifier (session, visitor, or user) and its events in
//! ascending timestamp order, builds the ordered timeline, per-event
//! cart-state snapshots, conversion points, and at most one abandonment
//! point.

use serde::{Deserialize, Serialize};

use engine_core::{Error, Event, Result};

/// Lookup granularity for journey queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierType {
    /// A single browsing session (`session_hash`).
    Session,
    /// A persistent anonymous identity (`visitor_hash`).
    Visitor,
    /// An authenticated account (`user_id`).
    User,
}

impl std::str::FromStr for IdentifierType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "session" => Ok(Self::Session),
            "visitor" => Ok(Self::Visitor),
            "user" => Ok(Self::User),
            other => Err(Error::validation(format!(
                "invalid identifierType: {other} (expected session, visitor, or user)"
            ))),
        }
    }
}

impl IdentifierType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Visitor => "visitor",
            Self::User => "user",
        }
    }
}

/// One timeline entry, flattened for the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub timestamp: i64,
    pub event_type: engine_core::EventType,
    pub category: String,
    pub action: String,
    pub page: String,
    pub label: Option<String>,
    pub value: Option<f64>,
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<u32>,
    /// Seconds since the previous timeline entry; 0 for the first.
    pub time_since_prev_seconds: i64,
}

/// Per-event cart snapshot. This is a snapshot sequence, not a running
/// total; consumers fold over it to reconstruct cumulative state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    pub timestamp: i64,
    pub has_items: bool,
    pub item_count: u32,
    pub total_value: f64,
    pub in_checkout: bool,
    pub purchased: bool,
}

/// A purchase within the journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionPoint {
    pub timestamp: i64,
    pub page: String,
    pub value: f64,
}

/// The last cart-related action of a non-converting journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbandonmentPoint {
    pub timestamp: i64,
    pub page: String,
    pub last_action: String,
    pub cart_value: f64,
}

/// Journey summary block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneySummary {
    pub total_events: u64,
    pub total_pages: u64,
    pub total_actions: u64,
    pub has_conversion: bool,
    pub has_abandonment: bool,
    /// Last-minus-first timestamp in minutes; 0 with one event or fewer.
    pub duration: f64,
}

/// A reconstructed visitor journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    pub identifier: String,
    pub identifier_type: IdentifierType,
    pub timeline: Vec<TimelineEntry>,
    /// Unique page paths in first-occurrence order.
    pub pages: Vec<String>,
    /// Unique actions in first-occurrence order.
    pub actions: Vec<String>,
    pub cart_state: Vec<CartState>,
    pub conversion_points: Vec<ConversionPoint>,
    pub abandonment_points: Vec<AbandonmentPoint>,
    pub summary: JourneySummary,
}

impl Journey {
    /// The explicit empty-journey shape returned when no events match.
    pub fn empty(identifier: impl Into<String>, identifier_type: IdentifierType) -> Self {
        Self {
            identifier: identifier.into(),
            identifier_type,
            timeline: Vec::new(),
            pages: Vec::new(),
            actions: Vec::new(),
            cart_state: Vec::new(),
            conversion_points: Vec::new(),
            abandonment_points: Vec::new(),
            summary: JourneySummary::default(),
        }
    }
}

/// Reconstructs a journey from events already ordered by timestamp
/// ascending.
pub fn reconstruct(
    identifier: &str,
    identifier_type: IdentifierType,
    events: &[Event],
) -> Journey {
    if events.is_empty() {
        return Journey::empty(identifier, identifier_type);
    }

    let mut timeline = Vec::with_capacity(events.len());
    let mut pages: Vec<String> = Vec::new();
    let mut actions: Vec<String> = Vec::new();
    let mut cart_state = Vec::with_capacity(events.len());
    let mut conversion_points = Vec::new();

    let mut prev_timestamp = None;
    for e in events {
        let commerce = e.commerce.as_ref();
        timeline.push(TimelineEntry {
            timestamp: e.timestamp,
            event_type: e.event_type,
            category: e.category.clone(),
            action: e.action.clone(),
            page: e.page.clone(),
            label: e.label.clone(),
            value: e.value,
            product_id: commerce.and_then(|c| c.product_id.clone()),
            product_name: commerce.and_then(|c| c.product_name.clone()),
            price: commerce.and_then(|c| c.price),
            quantity: commerce.and_then(|c| c.quantity),
            time_since_prev_seconds: prev_timestamp.map(|p| e.timestamp - p).unwrap_or(0),
        });
        prev_timestamp = Some(e.timestamp);

        if !pages.contains(&e.page) {
            pages.push(e.page.clone());
        }
        if !actions.contains(&e.action) {
            actions.push(e.action.clone());
        }

        let quantity = commerce.and_then(|c| c.quantity).unwrap_or(0);
        let price = commerce.and_then(|c| c.price).unwrap_or(0.0);
        cart_state.push(CartState {
            timestamp: e.timestamp,
            has_items: e.is_add_action(),
            item_count: quantity,
            total_value: price * f64::from(quantity),
            in_checkout: e.action == "begin_checkout",
            purchased: e.action == "purchase",
        });

        if e.action == "purchase" {
            conversion_points.push(ConversionPoint {
                timestamp: e.timestamp,
                page: e.page.clone(),
                value: e.revenue(),
            });
        }
    }

    let abandonment_points = find_abandonment(events);

    let duration = if events.len() < 2 {
        0.0
    } else {
        let span = events[events.len() - 1].timestamp - events[0].timestamp;
        crate::metrics::round2(span as f64 / 60.0)
    };

    let summary = JourneySummary {
        total_events: events.len() as u64,
        total_pages: pages.len() as u64,
        total_actions: actions.len() as u64,
        has_conversion: !conversion_points.is_empty(),
        has_abandonment: !abandonment_points.is_empty(),
        duration,
    };

    Journey {
        identifier: identifier.to_string(),
        identifier_type,
        timeline,
        pages,
        actions,
        cart_state,
        conversion_points,
        abandonment_points,
        summary,
    }
}

/// Backward scan for the abandonment point.
///
/// Walks the timeline in reverse: a purchase anywhere cancels abandonment
/// (the scan exits on the first one it meets, and a candidate found before an
/// earlier purchase is discarded when that purchase is reached). Otherwise
/// the first cart-related action met — the chronologically last — becomes the
/// single abandonment point.
fn find_abandonment(events: &[Event]) -> Vec<AbandonmentPoint> {
    let mut candidate: Option<&Event> = None;
    for e in events.iter().rev() {
        if e.action == "purchase" {
            candidate = None;
            break;
        }
        if candidate.is_none() && e.is_cart_action() {
            candidate = Some(e);
        }
    }

    candidate
        .map(|e| {
            let cart_value = e.value.unwrap_or_else(|| {
                e.commerce
                    .as_ref()
                    .and_then(|c| c.price.map(|p| p * f64::from(c.quantity.unwrap_or(1))))
                    .unwrap_or(0.0)
            });
            vec![AbandonmentPoint {
                timestamp: e.timestamp,
                page: e.page.clone(),
                last_action: e.action.clone(),
                cart_value,
            }]
        })
        .unwrap_or_default()
}
