use chrono::Duration;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex};

use crate::db::store::AqiStore;
use crate::errors::AppError;
use crate::services::aqi::validate_city_name;
use crate::services::openweather::AirQualityProvider;

pub mod alerts;
pub mod aqi;
pub mod cities;
pub mod forecast;
pub mod health;

/// Shared application state for the AQI endpoints.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AqiStore>,
    pub provider: Arc<dyn AirQualityProvider>,
    pub forecast_rng: Arc<Mutex<StdRng>>,
    pub alert_cooldown: Duration,
    pub default_city: String,
}

impl AppState {
    /// City name from the query string, falling back to the configured default.
    pub(crate) fn city_name(&self, raw: Option<&str>) -> Result<String, AppError> {
        validate_city_name(raw.unwrap_or(&self.default_city))
    }
}
