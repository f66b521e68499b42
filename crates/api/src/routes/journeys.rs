//! Journey endpoint handler.

use std::time::Instant;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use telemetry::metrics;
use tracing::info;
use validator::Validate;

use analytics::{IdentifierType, Journey};
use engine_core::DateRange;

use crate::response::ApiError;
use crate::state::AppState;

/// Query parameters for `GET /journeys`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JourneysQuery {
    #[validate(length(min = 1, max = 256))]
    pub identifier: Option<String>,
    pub identifier_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// GET /journeys - reconstructs one identifier's ordered journey.
pub async fn journeys_handler(
    State(state): State<AppState>,
    Query(query): Query<JourneysQuery>,
) -> Result<Json<Journey>, ApiError> {
    let started = Instant::now();
    metrics().queries_received.inc();

    query
        .validate()
        .map_err(|e| ApiError::bad_request(format!("invalid parameters: {e}")))?;

    let identifier = query
        .identifier
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("identifier is required"))?;

    let identifier_type: IdentifierType = query
        .identifier_type
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("identifierType is required"))?
        .parse()?;

    let range = match (query.start_date.as_deref(), query.end_date.as_deref()) {
        (Some(start), Some(end)) => Some(DateRange::parse(start, end)?),
        (None, None) => None,
        _ => {
            return Err(ApiError::bad_request(
                "startDate and endDate must be given together",
            ))
        }
    };

    let (journey, cached) = state
        .service
        .journey(&identifier, identifier_type, range)
        .await?;

    info!(
        identifier_type = identifier_type.as_str(),
        events = journey.summary.total_events,
        converted = journey.summary.has_conversion,
        cached,
        latency_ms = started.elapsed().as_millis() as u64,
        "Journey query served"
    );

    Ok(Json(journey))
}
