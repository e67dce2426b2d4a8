use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{Alert, AlertSeverity, AqiReading, City, Pollutants, Prediction};

const CITY_COLUMNS: &str = "id, name, country, latitude, longitude, is_active, created_at";
const READING_COLUMNS: &str =
    "id, city_id, aqi, co, no, no2, o3, so2, pm25, pm10, nh3, recorded_at";
const PREDICTION_COLUMNS: &str =
    "id, city_id, predicted_aqi, confidence_score, prediction_date, model_version, created_at";
const ALERT_COLUMNS: &str = "id, city_id, severity, message, is_active, created_at, resolved_at";

/// Parameters for inserting a new reading.
pub struct InsertReadingParams {
    pub city_id: Uuid,
    pub aqi: i32,
    pub pollutants: Pollutants,
    pub recorded_at: DateTime<Utc>,
}

/// Parameters for inserting one forecast day.
#[derive(Debug, Clone)]
pub struct InsertPredictionParams {
    pub predicted_aqi: f64,
    pub confidence_score: f64,
    pub prediction_date: NaiveDate,
    pub model_version: String,
}

/// Look up a city by its unique name.
pub async fn find_city_by_name(pool: &PgPool, name: &str) -> Result<Option<City>, sqlx::Error> {
    sqlx::query_as::<_, City>(&format!("SELECT {CITY_COLUMNS} FROM cities WHERE name = $1"))
        .bind(name)
        .fetch_optional(pool)
        .await
}

/// Get a city by name, creating it with sentinel coordinates if absent.
///
/// Concurrent callers may both attempt the insert; `ON CONFLICT DO NOTHING`
/// lets the loser fall through to the select and observe the winner's row.
pub async fn get_or_create_city(pool: &PgPool, name: &str) -> Result<City, sqlx::Error> {
    sqlx::query(
        "INSERT INTO cities (id, name, country, latitude, longitude, is_active)
         VALUES ($1, $2, 'Unknown', 0, 0, TRUE)
         ON CONFLICT (name) DO NOTHING",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .execute(pool)
    .await?;

    sqlx::query_as::<_, City>(&format!("SELECT {CITY_COLUMNS} FROM cities WHERE name = $1"))
        .bind(name)
        .fetch_one(pool)
        .await
}

/// Store resolved coordinates on a city. Last write wins.
pub async fn update_city_location(
    pool: &PgPool,
    city_id: Uuid,
    latitude: Decimal,
    longitude: Decimal,
    country: &str,
) -> Result<City, sqlx::Error> {
    sqlx::query_as::<_, City>(&format!(
        "UPDATE cities SET latitude = $2, longitude = $3, country = $4
         WHERE id = $1
         RETURNING {CITY_COLUMNS}"
    ))
    .bind(city_id)
    .bind(latitude)
    .bind(longitude)
    .bind(country)
    .fetch_one(pool)
    .await
}

/// List all active cities, ordered by name.
pub async fn list_active_cities(pool: &PgPool) -> Result<Vec<City>, sqlx::Error> {
    sqlx::query_as::<_, City>(&format!(
        "SELECT {CITY_COLUMNS} FROM cities WHERE is_active ORDER BY name"
    ))
    .fetch_all(pool)
    .await
}

/// Insert a new reading (append-only).
pub async fn insert_reading(
    pool: &PgPool,
    params: InsertReadingParams,
) -> Result<AqiReading, sqlx::Error> {
    let p = params.pollutants;
    sqlx::query_as::<_, AqiReading>(&format!(
        "INSERT INTO aqi_readings (
            id, city_id, aqi, co, no, no2, o3, so2, pm25, pm10, nh3, recorded_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING {READING_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(params.city_id)
    .bind(params.aqi)
    .bind(p.co)
    .bind(p.no)
    .bind(p.no2)
    .bind(p.o3)
    .bind(p.so2)
    .bind(p.pm25)
    .bind(p.pm10)
    .bind(p.nh3)
    .bind(params.recorded_at)
    .fetch_one(pool)
    .await
}

/// Readings for a city recorded at or after `since`, oldest first.
pub async fn get_readings_since(
    pool: &PgPool,
    city_id: Uuid,
    since: DateTime<Utc>,
) -> Result<Vec<AqiReading>, sqlx::Error> {
    sqlx::query_as::<_, AqiReading>(&format!(
        "SELECT {READING_COLUMNS} FROM aqi_readings
         WHERE city_id = $1 AND recorded_at >= $2
         ORDER BY recorded_at ASC"
    ))
    .bind(city_id)
    .bind(since)
    .fetch_all(pool)
    .await
}

/// The `limit` most recent readings for a city, newest first.
pub async fn get_recent_readings(
    pool: &PgPool,
    city_id: Uuid,
    limit: i64,
) -> Result<Vec<AqiReading>, sqlx::Error> {
    sqlx::query_as::<_, AqiReading>(&format!(
        "SELECT {READING_COLUMNS} FROM aqi_readings
         WHERE city_id = $1
         ORDER BY recorded_at DESC
         LIMIT $2"
    ))
    .bind(city_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Insert all days of one forecast run in a single transaction.
pub async fn insert_predictions(
    pool: &PgPool,
    city_id: Uuid,
    params: &[InsertPredictionParams],
) -> Result<Vec<Prediction>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut inserted = Vec::with_capacity(params.len());

    for p in params {
        let prediction = sqlx::query_as::<_, Prediction>(&format!(
            "INSERT INTO predictions (
                id, city_id, predicted_aqi, confidence_score, prediction_date, model_version, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING {PREDICTION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(city_id)
        .bind(p.predicted_aqi)
        .bind(p.confidence_score)
        .bind(p.prediction_date)
        .bind(&p.model_version)
        .fetch_one(&mut *tx)
        .await?;
        inserted.push(prediction);
    }

    tx.commit().await?;
    Ok(inserted)
}

/// Insert a new active alert.
pub async fn insert_alert(
    pool: &PgPool,
    city_id: Uuid,
    severity: AlertSeverity,
    message: &str,
) -> Result<Alert, sqlx::Error> {
    sqlx::query_as::<_, Alert>(&format!(
        "INSERT INTO alerts (id, city_id, severity, message, is_active, created_at)
         VALUES ($1, $2, $3, $4, TRUE, NOW())
         RETURNING {ALERT_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(city_id)
    .bind(severity.as_str())
    .bind(message)
    .fetch_one(pool)
    .await
}

/// Most recent active alert of a given severity created at or after `since`.
pub async fn get_latest_active_alert(
    pool: &PgPool,
    city_id: Uuid,
    severity: AlertSeverity,
    since: DateTime<Utc>,
) -> Result<Option<Alert>, sqlx::Error> {
    sqlx::query_as::<_, Alert>(&format!(
        "SELECT {ALERT_COLUMNS} FROM alerts
         WHERE city_id = $1 AND severity = $2 AND is_active AND created_at >= $3
         ORDER BY created_at DESC
         LIMIT 1"
    ))
    .bind(city_id)
    .bind(severity.as_str())
    .bind(since)
    .fetch_optional(pool)
    .await
}

/// Active alerts for a city created at or after `since`, newest first.
pub async fn get_active_alerts_since(
    pool: &PgPool,
    city_id: Uuid,
    since: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<Alert>, sqlx::Error> {
    sqlx::query_as::<_, Alert>(&format!(
        "SELECT {ALERT_COLUMNS} FROM alerts
         WHERE city_id = $1 AND is_active AND created_at >= $2
         ORDER BY created_at DESC
         LIMIT $3"
    ))
    .bind(city_id)
    .bind(since)
    .bind(limit)
    .fetch_all(pool)
    .await
}
