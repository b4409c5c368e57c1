//! Weather forecast endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use tracing::error;

use crate::errors::{ApiError, ApiResult};
use crate::influx::WeatherPoint;
use crate::state::AppState;

/// One week of minutes; the largest look-back window the query accepts.
const MAX_RANGE_MINUTES: i64 = 7 * 24 * 60;

#[derive(Debug, Deserialize)]
pub struct ForecastParams {
    /// Minutes back from now; out-of-range values are clamped.
    pub minutes: Option<i64>,
    /// Measurement name; defaults to the configured one.
    pub measurement: Option<String>,
}

/// Handler for GET /api/weather/forecast - returns wide-format points sorted
/// ascending by time.
pub async fn forecast_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ForecastParams>,
) -> ApiResult<Json<Vec<WeatherPoint>>> {
    let minutes = params.minutes.unwrap_or(60).clamp(1, MAX_RANGE_MINUTES);
    let measurement = params
        .measurement
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| state.config.influx_measurement.clone());

    let points = state
        .influx
        .query_range(minutes, &measurement)
        .await
        .map_err(|e| {
            error!("forecast query failed: {e}");
            ApiError::Internal(e.to_string())
        })?;

    Ok(Json(points))
}
