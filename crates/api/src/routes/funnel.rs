//! Funnel endpoint handler.

use std::time::Instant;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use telemetry::metrics;
use tracing::info;

use analytics::FunnelAnalysis;

use crate::response::ApiError;
use crate::routes::metrics::require_range;
use crate::state::AppState;

/// Query parameters for `GET /funnel`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// GET /funnel - ordered step counts with conversion and drop-off rates.
pub async fn funnel_handler(
    State(state): State<AppState>,
    Query(query): Query<FunnelQuery>,
) -> Result<Json<FunnelAnalysis>, ApiError> {
    let started = Instant::now();
    metrics().queries_received.inc();

    let range = require_range(query.start_date.as_deref(), query.end_date.as_deref())?;
    let (analysis, cached) = state.service.funnel(range).await?;

    info!(
        total_conversion_rate = analysis.total_conversion_rate,
        cached,
        latency_ms = started.elapsed().as_millis() as u64,
        "Funnel query served"
    );

    Ok(Json(analysis))
}
