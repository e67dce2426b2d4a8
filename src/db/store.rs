//! Storage seam used by the AQI pipeline.
//!
//! Handlers and services only see `dyn AqiStore`; production wires in
//! [`PgStore`], tests an in-memory implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{Alert, AlertSeverity, AqiReading, City, Prediction};
use super::queries::{self, InsertPredictionParams, InsertReadingParams};
use crate::helpers::f64_to_decimal_full;

#[async_trait]
pub trait AqiStore: Send + Sync {
    /// Look up a city without creating it.
    async fn find_city(&self, name: &str) -> Result<Option<City>, sqlx::Error>;

    /// Lookup, then create with sentinel coordinates if absent. Idempotent.
    async fn get_or_create_city(&self, name: &str) -> Result<City, sqlx::Error>;

    /// Persist resolved coordinates. Last write wins under concurrent resolution.
    async fn set_city_location(
        &self,
        city_id: Uuid,
        latitude: f64,
        longitude: f64,
        country: &str,
    ) -> Result<City, sqlx::Error>;

    async fn list_active_cities(&self) -> Result<Vec<City>, sqlx::Error>;

    async fn insert_reading(&self, params: InsertReadingParams)
        -> Result<AqiReading, sqlx::Error>;

    /// Readings at or after `since`, ascending by timestamp.
    async fn readings_since(
        &self,
        city_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<AqiReading>, sqlx::Error>;

    /// Up to `limit` readings, most recent first.
    async fn recent_readings(
        &self,
        city_id: Uuid,
        limit: i64,
    ) -> Result<Vec<AqiReading>, sqlx::Error>;

    async fn insert_predictions(
        &self,
        city_id: Uuid,
        params: &[InsertPredictionParams],
    ) -> Result<Vec<Prediction>, sqlx::Error>;

    async fn insert_alert(
        &self,
        city_id: Uuid,
        severity: AlertSeverity,
        message: &str,
    ) -> Result<Alert, sqlx::Error>;

    async fn latest_active_alert(
        &self,
        city_id: Uuid,
        severity: AlertSeverity,
        since: DateTime<Utc>,
    ) -> Result<Option<Alert>, sqlx::Error>;

    /// Active alerts at or after `since`, newest first, at most `limit`.
    async fn active_alerts_since(
        &self,
        city_id: Uuid,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Alert>, sqlx::Error>;
}

/// Postgres-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AqiStore for PgStore {
    async fn find_city(&self, name: &str) -> Result<Option<City>, sqlx::Error> {
        queries::find_city_by_name(&self.pool, name).await
    }

    async fn get_or_create_city(&self, name: &str) -> Result<City, sqlx::Error> {
        queries::get_or_create_city(&self.pool, name).await
    }

    async fn set_city_location(
        &self,
        city_id: Uuid,
        latitude: f64,
        longitude: f64,
        country: &str,
    ) -> Result<City, sqlx::Error> {
        queries::update_city_location(
            &self.pool,
            city_id,
            f64_to_decimal_full(latitude),
            f64_to_decimal_full(longitude),
            country,
        )
        .await
    }

    async fn list_active_cities(&self) -> Result<Vec<City>, sqlx::Error> {
        queries::list_active_cities(&self.pool).await
    }

    async fn insert_reading(
        &self,
        params: InsertReadingParams,
    ) -> Result<AqiReading, sqlx::Error> {
        queries::insert_reading(&self.pool, params).await
    }

    async fn readings_since(
        &self,
        city_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<AqiReading>, sqlx::Error> {
        queries::get_readings_since(&self.pool, city_id, since).await
    }

    async fn recent_readings(
        &self,
        city_id: Uuid,
        limit: i64,
    ) -> Result<Vec<AqiReading>, sqlx::Error> {
        queries::get_recent_readings(&self.pool, city_id, limit).await
    }

    async fn insert_predictions(
        &self,
        city_id: Uuid,
        params: &[InsertPredictionParams],
    ) -> Result<Vec<Prediction>, sqlx::Error> {
        queries::insert_predictions(&self.pool, city_id, params).await
    }

    async fn insert_alert(
        &self,
        city_id: Uuid,
        severity: AlertSeverity,
        message: &str,
    ) -> Result<Alert, sqlx::Error> {
        queries::insert_alert(&self.pool, city_id, severity, message).await
    }

    async fn latest_active_alert(
        &self,
        city_id: Uuid,
        severity: AlertSeverity,
        since: DateTime<Utc>,
    ) -> Result<Option<Alert>, sqlx::Error> {
        queries::get_latest_active_alert(&self.pool, city_id, severity, since).await
    }

    async fn active_alerts_since(
        &self,
        city_id: Uuid,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Alert>, sqlx::Error> {
        queries::get_active_alerts_since(&self.pool, city_id, since, limit).await
    }
}
