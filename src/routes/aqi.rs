//! Current and historical AQI endpoints.
//!
//! - GET /api/aqi/?city=NAME
//! - GET /api/historical/?city=NAME&hours=N

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::AppState;
use crate::errors::{AppError, ErrorResponse};
use crate::helpers::{aqi_index, round_2dp};
use crate::services::aqi::{
    fetch_current_aqi, reading_history, require_city, validate_history_hours,
};

/// Default history window when `hours` is omitted.
const DEFAULT_HISTORY_HOURS: i64 = 24;

#[derive(Debug, Deserialize, IntoParams)]
pub struct CityQuery {
    /// City name (defaults to the configured default city)
    pub city: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// City name (defaults to the configured default city)
    pub city: Option<String>,
    /// Look-back window in hours, 1 to 720 (default 24)
    pub hours: Option<String>,
}

/// Snapshot returned by the current-AQI endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct AqiSnapshotResponse {
    /// City name as requested
    pub city: String,
    /// Pseudo-AQI index (provider category × 50)
    pub aqi: i32,
    /// Carbon monoxide, µg/m³
    pub co: f64,
    /// Nitrogen monoxide, µg/m³
    pub no: f64,
    /// Nitrogen dioxide, µg/m³
    pub no2: f64,
    /// Ozone, µg/m³
    pub o3: f64,
    /// Sulphur dioxide, µg/m³
    pub so2: f64,
    /// Fine particulate matter (PM2.5), µg/m³
    pub pm25: f64,
    /// Coarse particulate matter (PM10), µg/m³
    pub pm10: f64,
    /// Ammonia, µg/m³
    pub nh3: f64,
    /// When the reading was stored (ISO 8601)
    pub timestamp: String,
}

/// One point of the history chart.
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryPoint {
    /// Reading time of day, UTC ("HH:MM")
    pub time: String,
    /// Pseudo-AQI index (provider category × 50)
    pub aqi: i32,
    pub pm25: f64,
    pub pm10: f64,
    pub co: f64,
}

/// Fetch, store and return the current air quality for a city.
///
/// Resolves the city's coordinates on first use, stores the reading and
/// raises an alert when the AQI category is 3 or higher.
#[utoipa::path(
    get,
    path = "/api/aqi/",
    tag = "AQI",
    params(CityQuery),
    responses(
        (status = 200, description = "Current pollutant snapshot", body = AqiSnapshotResponse),
        (status = 400, description = "Invalid city parameter", body = ErrorResponse),
        (status = 404, description = "City could not be geocoded", body = ErrorResponse),
        (status = 503, description = "Air-quality provider unavailable", body = ErrorResponse),
    )
)]
pub async fn get_current_aqi(
    State(state): State<AppState>,
    Query(params): Query<CityQuery>,
) -> Result<Json<AqiSnapshotResponse>, AppError> {
    let city_name = state.city_name(params.city.as_deref())?;

    let current = fetch_current_aqi(
        state.store.as_ref(),
        state.provider.as_ref(),
        &city_name,
        state.alert_cooldown,
    )
    .await?;

    let p = current.reading.pollutants();
    Ok(Json(AqiSnapshotResponse {
        city: current.city.name,
        aqi: aqi_index(current.reading.aqi),
        co: round_2dp(p.co),
        no: round_2dp(p.no),
        no2: round_2dp(p.no2),
        o3: round_2dp(p.o3),
        so2: round_2dp(p.so2),
        pm25: round_2dp(p.pm25),
        pm10: round_2dp(p.pm10),
        nh3: round_2dp(p.nh3),
        timestamp: current.reading.recorded_at.to_rfc3339(),
    }))
}

/// Stored readings for a city over the last `hours`, oldest first.
#[utoipa::path(
    get,
    path = "/api/historical/",
    tag = "AQI",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Readings in ascending time order", body = Vec<HistoryPoint>),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 404, description = "City not found", body = ErrorResponse),
    )
)]
pub async fn get_historical(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryPoint>>, AppError> {
    let city_name = state.city_name(params.city.as_deref())?;
    let hours = match params.hours.as_deref() {
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::BadRequest(format!("Invalid hours: {}", raw)))?,
        None => DEFAULT_HISTORY_HOURS,
    };
    let hours = validate_history_hours(hours)?;

    let city = require_city(state.store.as_ref(), &city_name).await?;
    let readings = reading_history(state.store.as_ref(), &city, hours, Utc::now()).await?;

    let points = readings
        .iter()
        .map(|r| HistoryPoint {
            time: r.recorded_at.format("%H:%M").to_string(),
            aqi: aqi_index(r.aqi),
            pm25: round_2dp(r.pm25),
            pm10: round_2dp(r.pm10),
            co: round_2dp(r.co),
        })
        .collect();

    Ok(Json(points))
}
