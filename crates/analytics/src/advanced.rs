//! Advanced metric groups: device, category, behavior, and retention
//! analysis.
//!
//! These scan the full event set beyond the simple tallies, so they are only
//! computed when a query explicitly asks for them.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use engine_core::{Event, EventType};

use crate::metrics::{
    percentage, round2, AnalyticsMetrics, EcommerceMetrics, EngagementMetrics, TrendsData,
};

/// Share of events per device class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceShare {
    pub device: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceAnalysis {
    pub devices: Vec<DeviceShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRevenue {
    pub category: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAnalysis {
    pub distribution: Vec<CategoryShare>,
    pub revenue: Vec<CategoryRevenue>,
}

/// A page-to-page transition and how often it occurred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageFlow {
    pub flow: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDwell {
    pub page: String,
    pub average_time_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorAnalysis {
    pub top_flows: Vec<PageFlow>,
    pub average_page_times: Vec<PageDwell>,
    /// Share of sessions with exactly one event.
    pub bounce_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionAnalysis {
    pub returning_users: u64,
    pub new_users: u64,
    pub retention_rate: f64,
    pub average_sessions_per_user: f64,
}

/// Standard bundle plus the advanced groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedMetrics {
    pub ecommerce: EcommerceMetrics,
    pub engagement: EngagementMetrics,
    pub trends: TrendsData,
    pub devices: DeviceAnalysis,
    pub categories: CategoryAnalysis,
    pub behavior: BehaviorAnalysis,
    pub retention: RetentionAnalysis,
}

const TOP_FLOWS: usize = 10;

/// Computes the full advanced bundle.
pub fn calculate_advanced(events: &[Event], bucket_seconds: i64) -> AdvancedMetrics {
    let AnalyticsMetrics {
        ecommerce,
        engagement,
        trends,
    } = crate::metrics::calculate(events, bucket_seconds);

    let behavior = behavior(events, engagement.unique_sessions);

    AdvancedMetrics {
        ecommerce,
        engagement,
        trends,
        devices: devices(events),
        categories: categories(events),
        behavior,
        retention: retention(events),
    }
}

/// Event share per device class.
pub fn devices(events: &[Event]) -> DeviceAnalysis {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for e in events {
        let device = e.device_type.map(|d| d.as_str()).unwrap_or("unknown");
        *counts.entry(device).or_insert(0) += 1;
    }

    let total = events.len() as f64;
    let mut devices: Vec<DeviceShare> = counts
        .into_iter()
        .map(|(device, count)| DeviceShare {
            device: device.to_string(),
            count,
            percentage: percentage(count as f64, total),
        })
        .collect();
    devices.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.device.cmp(&b.device)));

    DeviceAnalysis { devices }
}

/// Event distribution and purchase revenue per collector category.
pub fn categories(events: &[Event]) -> CategoryAnalysis {
    let mut counts: HashMap<String, u64> = HashMap::new();
    let mut revenue: HashMap<String, f64> = HashMap::new();

    for e in events {
        let category = if e.category.is_empty() {
            "unknown".to_string()
        } else {
            e.category.clone()
        };
        *counts.entry(category.clone()).or_insert(0) += 1;

        if e.event_type == EventType::Purchase {
            *revenue.entry(category).or_insert(0.0) += e.revenue();
        }
    }

    let total = events.len() as f64;
    let mut distribution: Vec<CategoryShare> = counts
        .into_iter()
        .map(|(category, count)| CategoryShare {
            category,
            count,
            percentage: percentage(count as f64, total),
        })
        .collect();
    distribution.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.category.cmp(&b.category))
    });

    let mut revenue: Vec<CategoryRevenue> = revenue
        .into_iter()
        .map(|(category, revenue)| CategoryRevenue { category, revenue })
        .collect();
    revenue.sort_by(|a, b| {
        b.revenue
            .partial_cmp(&a.revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });

    CategoryAnalysis {
        distribution,
        revenue,
    }
}

/// Sequential-action analysis: page flows, per-page dwell, bounce rate.
pub fn behavior(events: &[Event], unique_sessions: u64) -> BehaviorAnalysis {
    // Group per session, ordered by timestamp.
    let mut sessions: HashMap<i64, Vec<&Event>> = HashMap::new();
    for e in events {
        sessions.entry(e.session_hash).or_default().push(e);
    }
    for session in sessions.values_mut() {
        session.sort_by_key(|e| e.timestamp);
    }

    let mut flows: HashMap<String, u64> = HashMap::new();
    let mut dwell: HashMap<String, Vec<i64>> = HashMap::new();
    let mut bounces = 0u64;

    for session in sessions.values() {
        if session.len() == 1 {
            bounces += 1;
        }
        for pair in session.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if from.page != to.page {
                *flows
                    .entry(format!("{} → {}", from.page, to.page))
                    .or_insert(0) += 1;
            }
            dwell
                .entry(from.page.clone())
                .or_default()
                .push(to.timestamp - from.timestamp);
        }
    }

    let mut top_flows: Vec<PageFlow> = flows
        .into_iter()
        .map(|(flow, count)| PageFlow { flow, count })
        .collect();
    top_flows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.flow.cmp(&b.flow)));
    top_flows.truncate(TOP_FLOWS);

    let mut average_page_times: Vec<PageDwell> = dwell
        .into_iter()
        .map(|(page, times)| PageDwell {
            page,
            average_time_seconds: round2(
                times.iter().sum::<i64>() as f64 / times.len() as f64,
            ),
        })
        .collect();
    average_page_times.sort_by(|a, b| a.page.cmp(&b.page));

    BehaviorAnalysis {
        top_flows,
        average_page_times,
        bounce_rate: percentage(bounces as f64, unique_sessions as f64),
    }
}

/// Repeat-visitor detection keyed on user-or-visitor identity.
pub fn retention(events: &[Event]) -> RetentionAnalysis {
    let mut user_sessions: HashMap<&str, HashSet<i64>> = HashMap::new();
    for e in events {
        if let Some(identity) = e.user_identity() {
            user_sessions
                .entry(identity)
                .or_default()
                .insert(e.session_hash);
        }
    }

    let total_users = user_sessions.len() as u64;
    let returning_users = user_sessions.values().filter(|s| s.len() > 1).count() as u64;
    let total_sessions: usize = user_sessions.values().map(HashSet::len).sum();

    RetentionAnalysis {
        returning_users,
        new_users: total_users - returning_users,
        retention_rate: percentage(returning_users as f64, total_users as f64),
        average_sessions_per_user: if total_users == 0 {
            0.0
        } else {
            round2(total_sessions as f64 / total_users as f64)
        },
    }
}
