//! Metrics endpoint handler.

use std::time::Instant;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use telemetry::metrics;
use tracing::info;

use analytics::{Comparison, MetricsReport, MetricsRequest};
use engine_core::DateRange;

use crate::response::ApiError;
use crate::state::AppState;

/// Query parameters for `GET /metrics`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub user_id: Option<String>,
    #[serde(default)]
    pub advanced: bool,
    #[serde(default)]
    pub compare: bool,
}

/// The queried period, echoed back.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Response for `GET /metrics`.
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    #[serde(flatten)]
    pub report: MetricsReport,
    pub period: Period,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
}

/// Parses the required `startDate`/`endDate` pair.
pub(crate) fn require_range(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<DateRange, ApiError> {
    let start = start.ok_or_else(|| ApiError::bad_request("startDate is required"))?;
    let end = end.ok_or_else(|| ApiError::bad_request("endDate is required"))?;
    Ok(DateRange::parse(start, end)?)
}

/// GET /metrics - time-bucketed metric groups for a date range.
pub async fn metrics_handler(
    State(state): State<AppState>,
    Query(query): Query<MetricsQuery>,
) -> Result<Json<MetricsResponse>, ApiError> {
    let started = Instant::now();
    metrics().queries_received.inc();

    let range = require_range(query.start_date.as_deref(), query.end_date.as_deref())?;

    let outcome = state
        .service
        .metrics(MetricsRequest {
            range,
            user_id: query.user_id,
            advanced: query.advanced,
            compare: query.compare,
        })
        .await?;

    metrics()
        .query_latency_ms
        .observe(started.elapsed().as_millis() as u64);

    info!(
        tier = %outcome.tier,
        advanced = query.advanced,
        cached = outcome.cached,
        latency_ms = started.elapsed().as_millis() as u64,
        "Metrics query served"
    );

    Ok(Json(MetricsResponse {
        report: outcome.report,
        period: Period {
            start_date: range.start,
            end_date: range.end,
        },
        comparison: outcome.comparison,
        cached: outcome.cached.then_some(true),
    }))
}
