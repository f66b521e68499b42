//! Event fixtures for integration tests.
//!
//! All fixtures live inside a fixed one-week window so tests can query
//! deterministic date ranges.

use chrono::NaiveDate;
use engine_core::{CommerceData, ElementData, Event, EventType};
use uuid::Uuid;

/// First day of the fixture window.
pub const WINDOW_START: &str = "2026-03-01";
/// Last day of the fixture window.
pub const WINDOW_END: &str = "2026-03-07";

/// Unix timestamp `secs` seconds into day `day_offset` of the window.
pub fn ts(day_offset: i64, secs: i64) -> i64 {
    let base = NaiveDate::parse_from_str(WINDOW_START, "%Y-%m-%d")
        .expect("valid window start")
        .and_hms_opt(0, 0, 0)
        .expect("valid midnight")
        .and_utc()
        .timestamp();
    base + day_offset * 86_400 + secs
}

/// Bare event in `session` at `timestamp`.
pub fn event(event_type: EventType, session: i64, timestamp: i64) -> Event {
    Event {
        id: Uuid::new_v4(),
        timestamp,
        event_type,
        category: "shop".into(),
        action: event_type.as_str().into(),
        label: None,
        value: None,
        session_hash: session,
        visitor_hash: format!("visitor-{session}"),
        user_id: None,
        page: "/".into(),
        device_type: None,
        commerce: None,
        element: None,
    }
}

/// Purchase worth `value`.
pub fn purchase(session: i64, timestamp: i64, value: f64) -> Event {
    let mut e = event(EventType::Purchase, session, timestamp);
    e.value = Some(value);
    e
}

/// Product view carrying a commerce payload.
pub fn product_view(session: i64, timestamp: i64, product_id: &str, name: &str) -> Event {
    let mut e = event(EventType::ProductView, session, timestamp);
    e.page = format!("/product/{product_id}");
    e.commerce = Some(CommerceData {
        product_id: Some(product_id.into()),
        product_name: Some(name.into()),
        category_name: None,
        price: None,
        quantity: None,
    });
    e
}

/// DOM interaction on `page` targeting `selector`.
pub fn interaction(
    event_type: EventType,
    session: i64,
    timestamp: i64,
    page: &str,
    selector: &str,
) -> Event {
    let mut e = event(event_type, session, timestamp);
    e.page = page.into();
    e.category = "interaction".into();
    e.element = Some(ElementData {
        selector: selector.into(),
        position: None,
        dimensions: None,
    });
    e
}

/// The reference storefront scenario: 10 product views, 4 cart additions,
/// 2 checkout starts, 1 purchase worth 1000, spread over distinct sessions.
pub fn storefront_scenario() -> Vec<Event> {
    let mut events = Vec::new();
    for session in 0..10 {
        events.push(event(EventType::ProductView, session, ts(0, 100 + session)));
    }
    for session in 0..4 {
        events.push(event(EventType::AddToCart, session, ts(0, 200 + session)));
    }
    for session in 0..2 {
        events.push(event(EventType::BeginCheckout, session, ts(0, 300 + session)));
    }
    events.push(purchase(0, ts(0, 400), 1000.0));
    events
}

/// Sessions reaching the canonical funnel steps with the given widths.
pub fn staged_funnel(widths: [i64; 4]) -> Vec<Event> {
    let steps = [
        EventType::ProductView,
        EventType::AddToCart,
        EventType::BeginCheckout,
        EventType::Purchase,
    ];
    let mut events = Vec::new();
    for (i, (&step, &width)) in steps.iter().zip(widths.iter()).enumerate() {
        for session in 0..width {
            events.push(event(step, session, ts(0, 100 * (i as i64 + 1) + session)));
        }
    }
    events
}
