//! Element interaction endpoint handler.

use std::str::FromStr;
use std::time::Instant;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use telemetry::metrics;
use tracing::info;
use validator::Validate;

use analytics::ElementReport;
use engine_core::DeviceType;

use crate::response::ApiError;
use crate::routes::metrics::require_range;
use crate::state::AppState;

/// Query parameters for `GET /elements`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ElementsQuery {
    #[validate(length(min = 1, max = 2000))]
    pub route: Option<String>,
    pub device: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// GET /elements - most engaged on-page elements for one route.
pub async fn elements_handler(
    State(state): State<AppState>,
    Query(query): Query<ElementsQuery>,
) -> Result<Json<ElementReport>, ApiError> {
    let started = Instant::now();
    metrics().queries_received.inc();

    query
        .validate()
        .map_err(|e| ApiError::bad_request(format!("invalid parameters: {e}")))?;

    let route = query
        .route
        .filter(|r| !r.is_empty())
        .ok_or_else(|| ApiError::bad_request("route is required"))?;

    let device = match query.device.as_deref() {
        Some(d) if !d.is_empty() => Some(DeviceType::from_str(d)?),
        _ => None,
    };

    let range = require_range(query.start_date.as_deref(), query.end_date.as_deref())?;
    let (report, cached) = state.service.elements(&route, device, range).await?;

    info!(
        route = %report.route,
        elements = report.elements.len(),
        cached,
        latency_ms = started.elapsed().as_millis() as u64,
        "Elements query served"
    );

    Ok(Json(report))
}
