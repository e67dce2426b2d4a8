//! Scriptable provider fake shared by service and route tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::db::models::Pollutants;
use crate::services::openweather::{
    AirQualityProvider, GeoLocation, PollutionSnapshot, ProviderError,
};

pub enum GeoOutcome {
    Found(GeoLocation),
    NoMatch,
    Fail,
}

pub struct FakeProvider {
    geo: GeoOutcome,
    pollution: Option<PollutionSnapshot>,
    geocode_calls: AtomicUsize,
    pollution_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new(geo: GeoOutcome, pollution: Option<PollutionSnapshot>) -> Self {
        Self {
            geo,
            pollution,
            geocode_calls: AtomicUsize::new(0),
            pollution_calls: AtomicUsize::new(0),
        }
    }

    /// Provider that knows Lahore and reports the given category and PM2.5.
    pub fn lahore(aqi: i32, pm25: f64) -> Self {
        Self::new(
            GeoOutcome::Found(GeoLocation {
                latitude: 31.5,
                longitude: 74.3,
                country: "Pakistan".to_string(),
            }),
            Some(PollutionSnapshot {
                aqi,
                pollutants: Pollutants {
                    co: 200.5,
                    pm25,
                    pm10: 80.0,
                    ..Pollutants::default()
                },
            }),
        )
    }

    pub fn geocode_calls(&self) -> usize {
        self.geocode_calls.load(Ordering::SeqCst)
    }

    pub fn pollution_calls(&self) -> usize {
        self.pollution_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AirQualityProvider for FakeProvider {
    async fn geocode(&self, _city: &str) -> Result<Option<GeoLocation>, ProviderError> {
        self.geocode_calls.fetch_add(1, Ordering::SeqCst);
        match &self.geo {
            GeoOutcome::Found(loc) => Ok(Some(loc.clone())),
            GeoOutcome::NoMatch => Ok(None),
            GeoOutcome::Fail => Err(ProviderError::Status(500)),
        }
    }

    async fn current_pollution(
        &self,
        _latitude: f64,
        _longitude: f64,
    ) -> Result<PollutionSnapshot, ProviderError> {
        self.pollution_calls.fetch_add(1, Ordering::SeqCst);
        self.pollution.clone().ok_or(ProviderError::EmptyResponse)
    }
}
