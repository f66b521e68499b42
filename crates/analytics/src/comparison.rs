//! Period-over-period comparison.
//!
//! Derives the immediately preceding period of identical length and computes
//! percentage deltas against the current period. Each period's metrics run
//! through the calculator (and therefore the cache) independently.

use serde::{Deserialize, Serialize};

use engine_core::DateRange;

use crate::metrics::{round2, AnalyticsMetrics, EcommerceMetrics, EngagementMetrics};

/// Percentage change from `previous` to `current`.
///
/// A zero baseline reports +100 when the metric appeared, 0 when it stayed
/// absent.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        if current > 0.0 {
            100.0
        } else {
            0.0
        }
    } else {
        round2((current - previous) / previous * 100.0)
    }
}

/// Deltas for the headline metrics, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricChanges {
    pub cart_additions: f64,
    pub checkout_starts: f64,
    pub checkout_completions: f64,
    pub product_views: f64,
    pub conversion_rate: f64,
    pub total_revenue: f64,
    pub average_order_value: f64,
    pub unique_sessions: f64,
    pub unique_users: f64,
}

/// The previous period's metrics, labeled with its range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousPeriod {
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    pub ecommerce: EcommerceMetrics,
    pub engagement: EngagementMetrics,
}

/// Comparison block attached to a metrics response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub previous_period: PreviousPeriod,
    pub changes: MetricChanges,
}

/// Builds the comparison block from both periods' metrics.
pub fn compare(
    previous_range: &DateRange,
    current: &AnalyticsMetrics,
    previous: AnalyticsMetrics,
) -> Comparison {
    let changes = MetricChanges {
        cart_additions: percent_change(
            current.ecommerce.cart_additions as f64,
            previous.ecommerce.cart_additions as f64,
        ),
        checkout_starts: percent_change(
            current.ecommerce.checkout_starts as f64,
            previous.ecommerce.checkout_starts as f64,
        ),
        checkout_completions: percent_change(
            current.ecommerce.checkout_completions as f64,
            previous.ecommerce.checkout_completions as f64,
        ),
        product_views: percent_change(
            current.ecommerce.product_views as f64,
            previous.ecommerce.product_views as f64,
        ),
        conversion_rate: percent_change(
            current.ecommerce.conversion_rate,
            previous.ecommerce.conversion_rate,
        ),
        total_revenue: percent_change(
            current.ecommerce.total_revenue,
            previous.ecommerce.total_revenue,
        ),
        average_order_value: percent_change(
            current.ecommerce.average_order_value,
            previous.ecommerce.average_order_value,
        ),
        unique_sessions: percent_change(
            current.engagement.unique_sessions as f64,
            previous.engagement.unique_sessions as f64,
        ),
        unique_users: percent_change(
            current.engagement.unique_users as f64,
            previous.engagement.unique_users as f64,
        ),
    };

    Comparison {
        previous_period: PreviousPeriod {
            start_date: previous_range.start,
            end_date: previous_range.end,
            ecommerce: previous.ecommerce,
            engagement: previous.engagement,
        },
        changes,
    }
}
