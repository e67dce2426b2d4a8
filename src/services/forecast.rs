//! Seven-day AQI forecast.
//!
//! Heuristic, not a trained model: every day's prediction is the mean
//! pseudo-AQI index (category × 50) of the 10 most recent readings plus a
//! uniform integer perturbation in [-10, 10), with a confidence drawn from
//! [75, 95). The baseline does not shift with the day index, so the forecast
//! is flat apart from noise.
//!
//! Randomness comes from an injected RNG so tests can seed it.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use std::sync::Mutex;

use crate::db::models::{AqiReading, City};
use crate::db::queries::InsertPredictionParams;
use crate::db::store::AqiStore;
use crate::errors::AppError;
use crate::helpers::aqi_index;

/// Minimum stored readings before a forecast may be generated.
pub const MIN_READINGS_FOR_FORECAST: usize = 10;
/// Readings fetched from history per forecast run.
pub const FORECAST_HISTORY_LIMIT: i64 = 100;
/// Most-recent readings averaged into the baseline.
pub const BASELINE_WINDOW: usize = 10;
/// Number of forecast days.
pub const FORECAST_DAYS: i64 = 7;
/// Label stored with every prediction.
pub const MODEL_VERSION: &str = "heuristic-v1";

const PERTURBATION_MIN: i32 = -10;
const PERTURBATION_MAX: i32 = 10;
const CONFIDENCE_MIN: f64 = 75.0;
const CONFIDENCE_MAX: f64 = 95.0;

/// One forecast day, unrounded.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDay {
    /// 1-based offset from the generation date.
    pub day: i64,
    pub target_date: NaiveDate,
    /// Predicted pseudo-AQI index.
    pub predicted_aqi: f64,
    pub confidence: f64,
}

impl ForecastDay {
    pub fn label(&self) -> String {
        format!("Day {}", self.day)
    }
}

/// Mean pseudo-AQI index over the first `BASELINE_WINDOW` readings.
///
/// `readings` must be ordered most recent first.
pub fn baseline_index(readings: &[AqiReading]) -> f64 {
    let window: Vec<f64> = readings
        .iter()
        .take(BASELINE_WINDOW)
        .map(|r| aqi_index(r.aqi) as f64)
        .collect();
    if window.is_empty() {
        return 0.0;
    }
    window.iter().sum::<f64>() / window.len() as f64
}

/// Build the 7-day forecast from readings ordered most recent first.
///
/// Per day the RNG is drawn twice: the perturbation, then the confidence.
pub fn generate_forecast<R: Rng>(
    readings: &[AqiReading],
    today: NaiveDate,
    rng: &mut R,
) -> Result<Vec<ForecastDay>, AppError> {
    if readings.len() < MIN_READINGS_FOR_FORECAST {
        return Err(AppError::InsufficientData(
            "Insufficient data for forecast".to_string(),
        ));
    }

    let baseline = baseline_index(readings);

    Ok((1..=FORECAST_DAYS)
        .map(|day| {
            let perturbation = rng.random_range(PERTURBATION_MIN..PERTURBATION_MAX);
            let confidence = rng.random_range(CONFIDENCE_MIN..CONFIDENCE_MAX);
            ForecastDay {
                day,
                target_date: today + Duration::days(day),
                predicted_aqi: baseline + perturbation as f64,
                confidence,
            }
        })
        .collect())
}

/// Generate a forecast for `city` and persist one prediction per day.
///
/// Repeated runs append new predictions; nothing is overwritten.
pub async fn run_forecast(
    store: &dyn AqiStore,
    rng: &Mutex<StdRng>,
    city: &City,
    now: DateTime<Utc>,
) -> Result<Vec<ForecastDay>, AppError> {
    let readings = store
        .recent_readings(city.id, FORECAST_HISTORY_LIMIT)
        .await?;

    let days = {
        let mut rng = rng
            .lock()
            .map_err(|_| AppError::InternalError("Forecast RNG lock poisoned".to_string()))?;
        generate_forecast(&readings, now.date_naive(), &mut *rng)?
    };

    let params: Vec<InsertPredictionParams> = days
        .iter()
        .map(|d| InsertPredictionParams {
            predicted_aqi: d.predicted_aqi,
            confidence_score: d.confidence,
            prediction_date: d.target_date,
            model_version: MODEL_VERSION.to_string(),
        })
        .collect();
    store.insert_predictions(city.id, &params).await?;

    tracing::info!(
        "Generated {}-day forecast for {} from {} readings (baseline {:.2})",
        days.len(),
        city.name,
        readings.len(),
        baseline_index(&readings)
    );

    Ok(days)
}
