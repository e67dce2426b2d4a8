//! Current-reading pipeline and reading history.
//!
//! One `fetch_current_aqi` call runs, in order:
//!   1. get-or-create the city by name
//!   2. resolve coordinates via geocoding, skipped when already cached
//!   3. fetch the current pollutant snapshot
//!   4. persist the reading
//!   5. evaluate and persist an alert

use chrono::{DateTime, Duration, Utc};

use crate::db::models::{Alert, AqiReading, City};
use crate::db::queries::InsertReadingParams;
use crate::db::store::AqiStore;
use crate::errors::AppError;
use crate::services::alerts;
use crate::services::openweather::AirQualityProvider;

/// Longest accepted city name.
pub const MAX_CITY_NAME_LEN: usize = 100;
/// Largest accepted history window (30 days).
pub const MAX_HISTORY_HOURS: i64 = 720;

/// A city together with the coordinates used for the provider call.
#[derive(Debug, Clone)]
pub struct LocatedCity {
    pub city: City,
    pub latitude: f64,
    pub longitude: f64,
}

/// Outcome of one current-reading pipeline run.
#[derive(Debug, Clone)]
pub struct CurrentAqi {
    pub city: City,
    pub reading: AqiReading,
    /// The alert raised by this reading, if any rule fired and was not suppressed.
    /// Not part of the snapshot response.
    #[allow(dead_code)]
    pub alert: Option<Alert>,
}

/// Trim and bound-check a city name from a query string.
pub fn validate_city_name(raw: &str) -> Result<String, AppError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("city must not be empty".to_string()));
    }
    if name.chars().count() > MAX_CITY_NAME_LEN {
        return Err(AppError::BadRequest(format!(
            "city must be at most {} characters",
            MAX_CITY_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

/// Validate the `hours` window for the history query.
pub fn validate_history_hours(hours: i64) -> Result<i64, AppError> {
    if !(1..=MAX_HISTORY_HOURS).contains(&hours) {
        return Err(AppError::BadRequest(format!(
            "hours must be between 1 and {}",
            MAX_HISTORY_HOURS
        )));
    }
    Ok(hours)
}

/// Ensure the city has coordinates, geocoding at most once per city.
///
/// Cities still holding the (0, 0) sentinel are geocoded and the result is
/// written back. Concurrent first requests may both geocode; the second write
/// stores equivalent values.
pub async fn resolve_city_location(
    store: &dyn AqiStore,
    provider: &dyn AirQualityProvider,
    city: City,
) -> Result<LocatedCity, AppError> {
    if let Some((latitude, longitude)) = city.coordinates() {
        return Ok(LocatedCity {
            city,
            latitude,
            longitude,
        });
    }

    match provider.geocode(&city.name).await {
        Ok(Some(location)) => {
            let city = store
                .set_city_location(
                    city.id,
                    location.latitude,
                    location.longitude,
                    &location.country,
                )
                .await?;
            tracing::info!(
                "Resolved {} to ({}, {}) in {}",
                city.name,
                location.latitude,
                location.longitude,
                location.country
            );
            Ok(LocatedCity {
                city,
                latitude: location.latitude,
                longitude: location.longitude,
            })
        }
        Ok(None) => Err(AppError::NotFound(format!(
            "City \"{}\" not found",
            city.name
        ))),
        Err(e) => {
            tracing::warn!("Geocoding failed for {}: {}", city.name, e);
            Err(AppError::ProviderUnavailable(format!(
                "Failed to resolve coordinates for \"{}\"",
                city.name
            )))
        }
    }
}

/// Run the full current-reading pipeline for a city name.
pub async fn fetch_current_aqi(
    store: &dyn AqiStore,
    provider: &dyn AirQualityProvider,
    city_name: &str,
    alert_cooldown: Duration,
) -> Result<CurrentAqi, AppError> {
    let city = store.get_or_create_city(city_name).await?;
    let located = resolve_city_location(store, provider, city).await?;

    let snapshot = provider
        .current_pollution(located.latitude, located.longitude)
        .await
        .map_err(|e| {
            tracing::warn!(
                "Pollution fetch failed for {} ({}, {}): {}",
                located.city.name,
                located.latitude,
                located.longitude,
                e
            );
            AppError::ProviderUnavailable("Failed to fetch pollution data".to_string())
        })?;

    let now = Utc::now();
    let reading = store
        .insert_reading(InsertReadingParams {
            city_id: located.city.id,
            aqi: snapshot.aqi,
            pollutants: snapshot.pollutants,
            recorded_at: now,
        })
        .await?;
    tracing::debug!(
        "Stored reading {} for {} (AQI category {})",
        reading.id,
        located.city.name,
        reading.aqi
    );

    let alert = alerts::raise_alert(store, &located.city, snapshot.aqi, alert_cooldown, now).await?;

    Ok(CurrentAqi {
        city: located.city,
        reading,
        alert,
    })
}

/// Look up an existing city, without creating it.
pub async fn require_city(store: &dyn AqiStore, city_name: &str) -> Result<City, AppError> {
    store
        .find_city(city_name)
        .await?
        .ok_or_else(|| AppError::NotFound("City not found".to_string()))
}

/// Readings in `[now - hours, now]`, oldest first.
pub async fn reading_history(
    store: &dyn AqiStore,
    city: &City,
    hours: i64,
    now: DateTime<Utc>,
) -> Result<Vec<AqiReading>, AppError> {
    let since = now - Duration::hours(hours);
    let readings = store.readings_since(city.id, since).await?;
    Ok(readings
        .into_iter()
        .filter(|r| r.recorded_at <= now)
        .collect())
}
