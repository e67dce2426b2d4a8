use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::AppState;
use crate::db::models;
use crate::errors::AppError;
use crate::helpers::dec_to_f64;

/// Response type for GET /api/cities/.
#[derive(Debug, Serialize, ToSchema)]
pub struct CityResponse {
    pub id: Uuid,
    pub name: String,
    /// Country code from geocoding, or "Unknown"
    pub country: String,
    /// Latitude (WGS84); 0 until resolved
    pub latitude: f64,
    /// Longitude (WGS84); 0 until resolved
    pub longitude: f64,
    pub is_active: bool,
}

impl From<models::City> for CityResponse {
    fn from(c: models::City) -> Self {
        Self {
            id: c.id,
            name: c.name,
            country: c.country,
            latitude: dec_to_f64(c.latitude),
            longitude: dec_to_f64(c.longitude),
            is_active: c.is_active,
        }
    }
}

/// List all active cities.
#[utoipa::path(
    get,
    path = "/api/cities/",
    tag = "Cities",
    responses(
        (status = 200, description = "All active cities", body = Vec<CityResponse>),
    )
)]
pub async fn list_cities(State(state): State<AppState>) -> Result<Json<Vec<CityResponse>>, AppError> {
    let cities = state.store.list_active_cities().await?;
    Ok(Json(cities.into_iter().map(CityResponse::from).collect()))
}
