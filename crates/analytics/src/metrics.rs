//! Core metric groups computed over a filtered event set.
//!
//! Every function here is a deterministic pure function of the event slice:
//! same events in, same metrics out. Fetching and caching compose around
//! these in the service layer.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use engine_core::{Event, EventType};

/// Rounds derived rates and averages to 2 decimals for the wire.
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub(crate) fn percentage(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        round2(numerator / denominator * 100.0)
    }
}

/// E-commerce metric group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcommerceMetrics {
    pub cart_additions: u64,
    pub cart_removals: u64,
    pub checkout_starts: u64,
    pub checkout_completions: u64,
    pub product_views: u64,
    pub category_views: u64,
    pub search_queries: u64,
    pub conversion_rate: f64,
    pub cart_abandonment_rate: f64,
    pub product_to_cart_rate: f64,
    pub average_order_value: f64,
    pub total_revenue: f64,
}

/// A ranked page entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageViews {
    pub page: String,
    pub views: u64,
}

/// A ranked product entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductViews {
    pub product_id: String,
    pub product_name: String,
    pub views: u64,
}

/// Engagement metric group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementMetrics {
    pub unique_sessions: u64,
    pub unique_users: u64,
    pub average_events_per_session: f64,
    /// Mean last-minus-first timestamp per session, in seconds.
    pub average_session_duration: f64,
    pub top_pages: Vec<PageViews>,
    pub top_products: Vec<ProductViews>,
}

/// One point in a time-bucketed series. `bucket` is the unix second the
/// bucket starts at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub bucket: i64,
    pub value: f64,
}

/// Time-bucketed trend series aligned with the cache tier's granularity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendsData {
    pub page_views: Vec<TrendPoint>,
    pub conversions: Vec<TrendPoint>,
    pub revenue: Vec<TrendPoint>,
}

/// The standard metrics bundle: ecommerce + engagement + trends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsMetrics {
    pub ecommerce: EcommerceMetrics,
    pub engagement: EngagementMetrics,
    pub trends: TrendsData,
}

const TOP_N: usize = 10;

/// Computes the standard metrics bundle. `bucket_seconds` sets trend
/// granularity and should come from the query's cache tier.
pub fn calculate(events: &[Event], bucket_seconds: i64) -> AnalyticsMetrics {
    AnalyticsMetrics {
        ecommerce: ecommerce(events),
        engagement: engagement(events),
        trends: trends(events, bucket_seconds),
    }
}

/// E-commerce tallies and derived rates over the filtered set.
pub fn ecommerce(events: &[Event]) -> EcommerceMetrics {
    let count_of = |t: EventType| events.iter().filter(|e| e.event_type == t).count() as u64;

    let cart_additions = count_of(EventType::AddToCart);
    let cart_removals = count_of(EventType::RemoveFromCart);
    let checkout_starts = count_of(EventType::BeginCheckout);
    let checkout_completions = count_of(EventType::Purchase);
    let product_views = count_of(EventType::ProductView);
    let search_queries = count_of(EventType::Search);

    let category_views = events
        .iter()
        .filter(|e| e.page.contains("/category/") || e.action == "view_category")
        .count() as u64;

    let total_revenue: f64 = events
        .iter()
        .filter(|e| e.event_type == EventType::Purchase)
        .map(Event::revenue)
        .sum();

    let average_order_value = if checkout_completions == 0 {
        0.0
    } else {
        round2(total_revenue / checkout_completions as f64)
    };

    let abandoned = checkout_starts.saturating_sub(checkout_completions);

    EcommerceMetrics {
        cart_additions,
        cart_removals,
        checkout_starts,
        checkout_completions,
        product_views,
        category_views,
        search_queries,
        conversion_rate: percentage(checkout_completions as f64, product_views as f64),
        cart_abandonment_rate: percentage(abandoned as f64, checkout_starts as f64),
        product_to_cart_rate: percentage(cart_additions as f64, product_views as f64),
        average_order_value,
        total_revenue,
    }
}

/// Session and audience engagement over the filtered set.
pub fn engagement(events: &[Event]) -> EngagementMetrics {
    let mut sessions: HashMap<i64, (i64, i64)> = HashMap::new();
    for e in events {
        let entry = sessions
            .entry(e.session_hash)
            .or_insert((e.timestamp, e.timestamp));
        entry.0 = entry.0.min(e.timestamp);
        entry.1 = entry.1.max(e.timestamp);
    }
    let unique_sessions = sessions.len() as u64;

    let unique_users = events
        .iter()
        .filter_map(Event::user_identity)
        .collect::<HashSet<_>>()
        .len() as u64;

    let average_events_per_session = if unique_sessions == 0 {
        0.0
    } else {
        round2(events.len() as f64 / unique_sessions as f64)
    };

    let average_session_duration = if sessions.is_empty() {
        0.0
    } else {
        let total: i64 = sessions.values().map(|(first, last)| last - first).sum();
        round2(total as f64 / sessions.len() as f64)
    };

    let top_pages = ranked(
        events
            .iter()
            .filter(|e| e.event_type == EventType::PageView)
            .map(|e| e.page.clone()),
    )
    .into_iter()
    .map(|(page, views)| PageViews { page, views })
    .collect();

    let mut product_names: HashMap<String, String> = HashMap::new();
    let top_products = ranked(
        events
            .iter()
            .filter(|e| e.event_type == EventType::ProductView)
            .map(|e| {
                let (id, name) = product_identity(e);
                product_names.entry(id.clone()).or_insert(name);
                id
            }),
    )
    .into_iter()
    .map(|(product_id, views)| ProductViews {
        product_name: product_names
            .get(&product_id)
            .cloned()
            .unwrap_or_else(|| product_id.clone()),
        product_id,
        views,
    })
    .collect();

    EngagementMetrics {
        unique_sessions,
        unique_users,
        average_events_per_session,
        average_session_duration,
        top_pages,
        top_products,
    }
}

fn product_identity(e: &Event) -> (String, String) {
    let commerce = e.commerce.as_ref();
    let id = commerce
        .and_then(|c| c.product_id.clone())
        .or_else(|| e.label.clone())
        .unwrap_or_else(|| "unknown".to_string());
    let name = commerce
        .and_then(|c| c.product_name.clone())
        .unwrap_or_else(|| id.clone());
    (id, name)
}

/// Counts occurrences, ranks descending, breaks ties by first-seen order,
/// and caps at the top 10.
fn ranked(keys: impl Iterator<Item = String>) -> Vec<(String, u64)> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();
    for key in keys {
        if !counts.contains_key(&key) {
            first_seen.push(key.clone());
        }
        *counts.entry(key).or_insert(0) += 1;
    }

    let order: HashMap<&str, usize> = first_seen
        .iter()
        .enumerate()
        .map(|(i, k)| (k.as_str(), i))
        .collect();

    let mut entries: Vec<(String, u64)> = counts.into_iter().collect();
    entries.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| order[a.0.as_str()].cmp(&order[b.0.as_str()]))
    });
    entries.truncate(TOP_N);
    entries
}

/// Buckets page views, conversions, and revenue by `bucket_seconds`.
/// Only non-empty buckets are emitted, in ascending order.
pub fn trends(events: &[Event], bucket_seconds: i64) -> TrendsData {
    let bucket_of = |ts: i64| ts - ts.rem_euclid(bucket_seconds);

    let mut page_views: HashMap<i64, f64> = HashMap::new();
    let mut conversions: HashMap<i64, f64> = HashMap::new();
    let mut revenue: HashMap<i64, f64> = HashMap::new();

    for e in events {
        let bucket = bucket_of(e.timestamp);
        match e.event_type {
            EventType::PageView => *page_views.entry(bucket).or_insert(0.0) += 1.0,
            EventType::Purchase => {
                *conversions.entry(bucket).or_insert(0.0) += 1.0;
                *revenue.entry(bucket).or_insert(0.0) += e.revenue();
            }
            _ => {}
        }
    }

    let to_series = |map: HashMap<i64, f64>| {
        let mut series: Vec<TrendPoint> = map
            .into_iter()
            .map(|(bucket, value)| TrendPoint { bucket, value })
            .collect();
        series.sort_by_key(|p| p.bucket);
        series
    };

    TrendsData {
        page_views: to_series(page_views),
        conversions: to_series(conversions),
        revenue: to_series(revenue),
    }
}
