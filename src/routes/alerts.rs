//! GET /api/alerts/?city=NAME: recent active alerts.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::aqi::CityQuery;
use super::AppState;
use crate::errors::{AppError, ErrorResponse};
use crate::helpers::time_ago;
use crate::services::alerts::recent_active_alerts;

#[derive(Debug, Serialize, ToSchema)]
pub struct AlertResponse {
    pub id: Uuid,
    /// "medium" or "high"
    pub severity: String,
    /// City name
    pub location: String,
    pub message: String,
    /// Relative age, e.g. "12 mins ago" or "3 hours ago"
    pub time: String,
}

/// Up to 5 active alerts for a city from the last 24 hours, newest first.
///
/// Unknown cities yield an empty list rather than 404.
#[utoipa::path(
    get,
    path = "/api/alerts/",
    tag = "Alerts",
    params(CityQuery),
    responses(
        (status = 200, description = "Recent active alerts", body = Vec<AlertResponse>),
        (status = 400, description = "Invalid city parameter", body = ErrorResponse),
    )
)]
pub async fn get_alerts(
    State(state): State<AppState>,
    Query(params): Query<CityQuery>,
) -> Result<Json<Vec<AlertResponse>>, AppError> {
    let city_name = state.city_name(params.city.as_deref())?;

    let Some(city) = state.store.find_city(&city_name).await? else {
        return Ok(Json(Vec::new()));
    };

    let now = Utc::now();
    let alerts = recent_active_alerts(state.store.as_ref(), &city, now).await?;

    Ok(Json(
        alerts
            .into_iter()
            .map(|a| AlertResponse {
                id: a.id,
                severity: a.severity,
                location: city.name.clone(),
                message: a.message,
                time: time_ago(a.created_at, now),
            })
            .collect(),
    ))
}
