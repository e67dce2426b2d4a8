//! Shared numeric and display helpers.
//!
//! Coordinates are stored as `NUMERIC` (Decimal) for exact round-tripping;
//! pollutant concentrations stay `f64` and are only rounded for display.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// Multiplier turning a provider AQI category (1–5) into the display index.
pub const AQI_INDEX_SCALE: i32 = 50;

/// Pseudo-AQI index for a provider category (category × 50).
pub fn aqi_index(category: i32) -> i32 {
    category * AQI_INDEX_SCALE
}

/// Round to 2 decimal places for API responses. Stored values are untouched.
pub fn round_2dp(v: f64) -> f64 {
    if !v.is_finite() {
        return 0.0;
    }
    (v * 100.0).round() / 100.0
}

/// Convert an f64 to Decimal preserving full precision.
///
/// Returns `Decimal::ZERO` for non-finite inputs (NaN, ±Inf).
pub(crate) fn f64_to_decimal_full(v: f64) -> Decimal {
    if !v.is_finite() {
        tracing::warn!(
            "f64_to_decimal_full received non-finite value {}, defaulting to 0",
            v
        );
        return Decimal::ZERO;
    }
    Decimal::from_f64(v).unwrap_or_else(|| Decimal::new(v as i64, 0))
}

/// Convert a Decimal to f64, defaulting to 0.0 for values that can't be represented.
pub(crate) fn dec_to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// Relative age of an alert: "N mins ago" under an hour, "N hours ago" otherwise.
///
/// Only the sub-day part of the age is reported; callers list alerts from the
/// last 24 hours.
pub fn time_ago(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - created_at).num_seconds().max(0) % 86_400;
    if secs < 3600 {
        format!("{} mins ago", secs / 60)
    } else {
        format!("{} hours ago", secs / 3600)
    }
}
