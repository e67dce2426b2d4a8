//! GET /api/forecast/?city=NAME: seven-day AQI forecast.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use super::aqi::CityQuery;
use super::AppState;
use crate::errors::{AppError, ErrorResponse};
use crate::helpers::round_2dp;
use crate::services::aqi::require_city;
use crate::services::forecast::run_forecast;

/// One forecast day.
#[derive(Debug, Serialize, ToSchema)]
pub struct ForecastEntry {
    /// Day label ("Day 1" … "Day 7")
    pub day: String,
    /// Predicted pseudo-AQI index, rounded to 2 decimals
    pub predicted_aqi: f64,
    /// Confidence score in [75, 95), rounded to 2 decimals
    pub confidence: f64,
}

/// Generate and store a 7-day forecast from the city's recent readings.
///
/// Requires at least 10 stored readings. Every call appends a fresh set of
/// predictions.
#[utoipa::path(
    get,
    path = "/api/forecast/",
    tag = "Forecast",
    params(CityQuery),
    responses(
        (status = 200, description = "Seven forecast days", body = Vec<ForecastEntry>),
        (status = 400, description = "Invalid city or fewer than 10 readings", body = ErrorResponse),
        (status = 404, description = "City not found", body = ErrorResponse),
    )
)]
pub async fn get_forecast(
    State(state): State<AppState>,
    Query(params): Query<CityQuery>,
) -> Result<Json<Vec<ForecastEntry>>, AppError> {
    let city_name = state.city_name(params.city.as_deref())?;
    let city = require_city(state.store.as_ref(), &city_name).await?;

    let days = run_forecast(
        state.store.as_ref(),
        &state.forecast_rng,
        &city,
        Utc::now(),
    )
    .await?;

    Ok(Json(
        days.iter()
            .map(|d| ForecastEntry {
                day: d.label(),
                predicted_aqi: round_2dp(d.predicted_aqi),
                confidence: round_2dp(d.confidence),
            })
            .collect(),
    ))
}
