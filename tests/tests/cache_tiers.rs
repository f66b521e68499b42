//! Tier selection and key tagging across the date-span boundaries.

use engine_core::{DateRange, EventFilter};
use metrics_cache::{generate_key, QueryKind, Tier};

fn tier_for(start: &str, end: &str) -> Tier {
    let range = DateRange::parse(start, end).unwrap();
    Tier::for_span_days(range.span_days())
}

#[test]
fn boundary_spans_select_the_shorter_ttl_tier() {
    // Exactly 1, 7, and 30 days stay on the shorter-TTL side.
    assert_eq!(tier_for("2026-03-01", "2026-03-01"), Tier::Realtime);
    assert_eq!(tier_for("2026-03-01", "2026-03-07"), Tier::Daily);
    assert_eq!(tier_for("2026-03-01", "2026-03-08"), Tier::Weekly);
    assert_eq!(tier_for("2026-03-01", "2026-03-30"), Tier::Weekly);
    assert_eq!(tier_for("2026-03-01", "2026-03-31"), Tier::Monthly);
}

#[test]
fn keys_are_tagged_with_the_selected_tier() {
    let seven_days = DateRange::parse("2026-03-01", "2026-03-07").unwrap();
    let eight_days = DateRange::parse("2026-03-01", "2026-03-08").unwrap();

    let key = |range: &DateRange| {
        let tier = Tier::for_span_days(range.span_days());
        generate_key(QueryKind::Metrics, &EventFilter::for_range(range), tier, &[])
    };

    assert!(key(&seven_days).starts_with("analytics:metrics:daily:"));
    assert!(key(&eight_days).starts_with("analytics:metrics:weekly:"));
}
