use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::helpers::dec_to_f64;

/// A city, created on first lookup by name.
///
/// Coordinates of (0, 0) mean "not yet resolved". A city whose real location
/// is on the equator and the prime meridian is indistinguishable from an
/// unresolved one and will be geocoded on every request.
#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)] // All fields populated by FromRow; created_at is not exposed
pub struct City {
    pub id: Uuid,
    pub name: String,
    pub country: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl City {
    /// Resolved (latitude, longitude), or `None` while the city still holds the (0, 0) sentinel.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        if self.latitude.is_zero() && self.longitude.is_zero() {
            None
        } else {
            Some((dec_to_f64(self.latitude), dec_to_f64(self.longitude)))
        }
    }
}

/// Eight pollutant concentrations in µg/m³.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pollutants {
    pub co: f64,
    pub no: f64,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    pub pm25: f64,
    pub pm10: f64,
    pub nh3: f64,
}

/// One stored pollutant snapshot. Immutable once written.
#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)] // All fields populated by FromRow; city_id is only read in tests
pub struct AqiReading {
    pub id: Uuid,
    pub city_id: Uuid,
    /// Provider AQI category, 1 (good) to 5 (very poor).
    pub aqi: i32,
    pub co: f64,
    pub no: f64,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    pub pm25: f64,
    pub pm10: f64,
    pub nh3: f64,
    pub recorded_at: DateTime<Utc>,
}

impl AqiReading {
    pub fn pollutants(&self) -> Pollutants {
        Pollutants {
            co: self.co,
            no: self.no,
            no2: self.no2,
            o3: self.o3,
            so2: self.so2,
            pm25: self.pm25,
            pm10: self.pm10,
            nh3: self.nh3,
        }
    }
}

/// A persisted forecast day.
#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)] // Populated by FromRow; not every field is read back by the API
pub struct Prediction {
    pub id: Uuid,
    pub city_id: Uuid,
    /// Predicted pseudo-AQI index (already ×50).
    pub predicted_aqi: f64,
    pub confidence_score: f64,
    pub prediction_date: NaiveDate,
    pub model_version: String,
    pub created_at: DateTime<Utc>,
}

/// Alert severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSeverity {
    Medium,
    High,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Medium => "medium",
            AlertSeverity::High => "high",
        }
    }
}

/// An alert raised from a reading. Never auto-resolved.
#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)] // Populated by FromRow; not every field is read back by the API
pub struct Alert {
    pub id: Uuid,
    pub city_id: Uuid,
    /// "medium" or "high"
    pub severity: String,
    pub message: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}
