//! In-memory `AqiStore` for unit tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use uuid::Uuid;

use super::models::{Alert, AlertSeverity, AqiReading, City, Pollutants, Prediction};
use super::queries::{InsertPredictionParams, InsertReadingParams};
use super::store::AqiStore;
use crate::helpers::f64_to_decimal_full;

#[derive(Default)]
struct Tables {
    cities: Vec<City>,
    readings: Vec<AqiReading>,
    predictions: Vec<Prediction>,
    alerts: Vec<Alert>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    /// Seed a city with the given coordinates.
    pub fn add_city(&self, name: &str, latitude: f64, longitude: f64) -> City {
        let city = City {
            id: Uuid::new_v4(),
            name: name.to_string(),
            country: "Unknown".to_string(),
            latitude: f64_to_decimal_full(latitude),
            longitude: f64_to_decimal_full(longitude),
            is_active: true,
            created_at: Utc::now(),
        };
        self.tables().cities.push(city.clone());
        city
    }

    pub fn deactivate_city(&self, city_id: Uuid) {
        if let Some(c) = self.tables().cities.iter_mut().find(|c| c.id == city_id) {
            c.is_active = false;
        }
    }

    /// Seed a reading at an arbitrary time.
    pub fn add_reading(&self, city_id: Uuid, aqi: i32, recorded_at: DateTime<Utc>) -> AqiReading {
        let reading = reading_row(
            city_id,
            aqi,
            Pollutants {
                pm25: 10.0 * aqi as f64,
                ..Pollutants::default()
            },
            recorded_at,
        );
        self.tables().readings.push(reading.clone());
        reading
    }

    /// Seed an alert with an arbitrary creation time.
    pub fn add_alert(
        &self,
        city_id: Uuid,
        severity: AlertSeverity,
        created_at: DateTime<Utc>,
        is_active: bool,
    ) -> Alert {
        let alert = Alert {
            id: Uuid::new_v4(),
            city_id,
            severity: severity.as_str().to_string(),
            message: format!("seeded {} alert", severity.as_str()),
            is_active,
            created_at,
            resolved_at: None,
        };
        self.tables().alerts.push(alert.clone());
        alert
    }

    pub fn readings(&self) -> Vec<AqiReading> {
        self.tables().readings.clone()
    }

    pub fn predictions(&self) -> Vec<Prediction> {
        self.tables().predictions.clone()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.tables().alerts.clone()
    }

    pub fn city(&self, name: &str) -> Option<City> {
        self.tables().cities.iter().find(|c| c.name == name).cloned()
    }
}

fn reading_row(
    city_id: Uuid,
    aqi: i32,
    p: Pollutants,
    recorded_at: DateTime<Utc>,
) -> AqiReading {
    AqiReading {
        id: Uuid::new_v4(),
        city_id,
        aqi,
        co: p.co,
        no: p.no,
        no2: p.no2,
        o3: p.o3,
        so2: p.so2,
        pm25: p.pm25,
        pm10: p.pm10,
        nh3: p.nh3,
        recorded_at,
    }
}

#[async_trait]
impl AqiStore for MemoryStore {
    async fn find_city(&self, name: &str) -> Result<Option<City>, sqlx::Error> {
        Ok(self.city(name))
    }

    async fn get_or_create_city(&self, name: &str) -> Result<City, sqlx::Error> {
        if let Some(city) = self.city(name) {
            return Ok(city);
        }
        Ok(self.add_city(name, 0.0, 0.0))
    }

    async fn set_city_location(
        &self,
        city_id: Uuid,
        latitude: f64,
        longitude: f64,
        country: &str,
    ) -> Result<City, sqlx::Error> {
        let mut tables = self.tables();
        let city = tables
            .cities
            .iter_mut()
            .find(|c| c.id == city_id)
            .ok_or(sqlx::Error::RowNotFound)?;
        city.latitude = f64_to_decimal_full(latitude);
        city.longitude = f64_to_decimal_full(longitude);
        city.country = country.to_string();
        Ok(city.clone())
    }

    async fn list_active_cities(&self) -> Result<Vec<City>, sqlx::Error> {
        let mut cities: Vec<City> = self
            .tables()
            .cities
            .iter()
            .filter(|c| c.is_active)
            .cloned()
            .collect();
        cities.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(cities)
    }

    async fn insert_reading(
        &self,
        params: InsertReadingParams,
    ) -> Result<AqiReading, sqlx::Error> {
        let reading = reading_row(
            params.city_id,
            params.aqi,
            params.pollutants,
            params.recorded_at,
        );
        self.tables().readings.push(reading.clone());
        Ok(reading)
    }

    async fn readings_since(
        &self,
        city_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<AqiReading>, sqlx::Error> {
        let mut rows: Vec<AqiReading> = self
            .tables()
            .readings
            .iter()
            .filter(|r| r.city_id == city_id && r.recorded_at >= since)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.recorded_at);
        Ok(rows)
    }

    async fn recent_readings(
        &self,
        city_id: Uuid,
        limit: i64,
    ) -> Result<Vec<AqiReading>, sqlx::Error> {
        let mut rows: Vec<AqiReading> = self
            .tables()
            .readings
            .iter()
            .filter(|r| r.city_id == city_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn insert_predictions(
        &self,
        city_id: Uuid,
        params: &[InsertPredictionParams],
    ) -> Result<Vec<Prediction>, sqlx::Error> {
        let now = Utc::now();
        let rows: Vec<Prediction> = params
            .iter()
            .map(|p| Prediction {
                id: Uuid::new_v4(),
                city_id,
                predicted_aqi: p.predicted_aqi,
                confidence_score: p.confidence_score,
                prediction_date: p.prediction_date,
                model_version: p.model_version.clone(),
                created_at: now,
            })
            .collect();
        self.tables().predictions.extend(rows.iter().cloned());
        Ok(rows)
    }

    async fn insert_alert(
        &self,
        city_id: Uuid,
        severity: AlertSeverity,
        message: &str,
    ) -> Result<Alert, sqlx::Error> {
        let alert = Alert {
            id: Uuid::new_v4(),
            city_id,
            severity: severity.as_str().to_string(),
            message: message.to_string(),
            is_active: true,
            created_at: Utc::now(),
            resolved_at: None,
        };
        self.tables().alerts.push(alert.clone());
        Ok(alert)
    }

    async fn latest_active_alert(
        &self,
        city_id: Uuid,
        severity: AlertSeverity,
        since: DateTime<Utc>,
    ) -> Result<Option<Alert>, sqlx::Error> {
        Ok(self
            .tables()
            .alerts
            .iter()
            .filter(|a| {
                a.city_id == city_id
                    && a.is_active
                    && a.severity == severity.as_str()
                    && a.created_at >= since
            })
            .max_by_key(|a| a.created_at)
            .cloned())
    }

    async fn active_alerts_since(
        &self,
        city_id: Uuid,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Alert>, sqlx::Error> {
        let mut rows: Vec<Alert> = self
            .tables()
            .alerts
            .iter()
            .filter(|a| a.city_id == city_id && a.is_active && a.created_at >= since)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }
}
