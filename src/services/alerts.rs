//! Threshold alerts derived from new readings.
//!
//! Rules (provider AQI category):
//! - 4 or 5 → high
//! - 3 → medium
//! - 1 or 2 → nothing
//!
//! A fired rule is suppressed when the city already has an active alert of the
//! same severity inside the cooldown window. Alerts are never auto-resolved.

use chrono::{DateTime, Duration, Utc};

use crate::db::models::{Alert, AlertSeverity, City};
use crate::db::store::AqiStore;
use crate::errors::AppError;

/// Window for the alerts listing.
pub const ALERT_LOOKBACK_HOURS: i64 = 24;
/// Maximum number of alerts returned by the listing.
pub const ALERT_LIST_LIMIT: i64 = 5;

/// An alert the rules want to raise, before persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertDraft {
    pub severity: AlertSeverity,
    pub message: String,
}

/// Evaluate the threshold rules for one reading.
pub fn evaluate_alert(city_name: &str, aqi_category: i32) -> Option<AlertDraft> {
    if aqi_category >= 4 {
        Some(AlertDraft {
            severity: AlertSeverity::High,
            message: format!(
                "Air quality is very poor in {}. Avoid outdoor activities.",
                city_name
            ),
        })
    } else if aqi_category == 3 {
        Some(AlertDraft {
            severity: AlertSeverity::Medium,
            message: format!(
                "Air quality is moderate in {}. Sensitive groups should limit outdoor exposure.",
                city_name
            ),
        })
    } else {
        None
    }
}

/// Evaluate the rules and persist the alert unless a duplicate is within `cooldown`.
///
/// A zero cooldown disables suppression.
pub async fn raise_alert(
    store: &dyn AqiStore,
    city: &City,
    aqi_category: i32,
    cooldown: Duration,
    now: DateTime<Utc>,
) -> Result<Option<Alert>, AppError> {
    let Some(draft) = evaluate_alert(&city.name, aqi_category) else {
        return Ok(None);
    };

    if cooldown > Duration::zero() {
        if let Some(existing) = store
            .latest_active_alert(city.id, draft.severity, now - cooldown)
            .await?
        {
            tracing::debug!(
                "Suppressing {} alert for {}: alert {} raised at {}",
                draft.severity.as_str(),
                city.name,
                existing.id,
                existing.created_at
            );
            return Ok(None);
        }
    }

    let alert = store
        .insert_alert(city.id, draft.severity, &draft.message)
        .await?;
    tracing::info!(
        "Raised {} alert for {} (AQI category {})",
        draft.severity.as_str(),
        city.name,
        aqi_category
    );
    Ok(Some(alert))
}

/// Active alerts for a city from the last 24 hours, newest first, at most 5.
pub async fn recent_active_alerts(
    store: &dyn AqiStore,
    city: &City,
    now: DateTime<Utc>,
) -> Result<Vec<Alert>, AppError> {
    let since = now - Duration::hours(ALERT_LOOKBACK_HOURS);
    Ok(store
        .active_alerts_since(city.id, since, ALERT_LIST_LIMIT)
        .await?)
}
