//! OpenWeather client: direct geocoding and current air pollution.
//!
//! See: https://openweathermap.org/api/geocoding-api
//! and https://openweathermap.org/api/air-pollution

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::OpenWeatherConfig;
use crate::db::models::Pollutants;

/// Failure talking to the air-quality provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned HTTP {0}")]
    Status(u16),

    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("provider returned no pollution entries")]
    EmptyResponse,
}

/// First geocoding match for a city name.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Country code, or "Unknown" if the provider omitted it.
    pub country: String,
}

/// The most current pollution entry for a coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct PollutionSnapshot {
    /// Provider AQI category, 1–5.
    pub aqi: i32,
    pub pollutants: Pollutants,
}

/// Upstream provider for coordinates and pollutant snapshots.
#[async_trait]
pub trait AirQualityProvider: Send + Sync {
    /// `Ok(None)` when the provider has no match for `city`.
    async fn geocode(&self, city: &str) -> Result<Option<GeoLocation>, ProviderError>;

    async fn current_pollution(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<PollutionSnapshot, ProviderError>;
}

// --- OpenWeather JSON response types ---

#[derive(Debug, Deserialize)]
struct GeoEntry {
    lat: f64,
    lon: f64,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PollutionResponse {
    #[serde(default)]
    list: Vec<PollutionEntry>,
}

#[derive(Debug, Deserialize)]
struct PollutionEntry {
    main: PollutionMain,
    #[serde(default)]
    components: PollutionComponents,
}

#[derive(Debug, Deserialize)]
struct PollutionMain {
    aqi: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PollutionComponents {
    co: f64,
    no: f64,
    no2: f64,
    o3: f64,
    so2: f64,
    #[serde(rename = "pm2_5")]
    pm25: f64,
    pm10: f64,
    nh3: f64,
}

/// Client for the OpenWeather geocoding and air-pollution APIs.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    api_key: String,
    geo_url: String,
    pollution_url: String,
}

impl OpenWeatherClient {
    pub fn new(config: &OpenWeatherConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            api_key: config.api_key.clone(),
            geo_url: config.geo_url.clone(),
            pollution_url: config.pollution_url.clone(),
        }
    }

    async fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, ProviderError> {
        let response = self.client.get(url).query(query).send().await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl AirQualityProvider for OpenWeatherClient {
    async fn geocode(&self, city: &str) -> Result<Option<GeoLocation>, ProviderError> {
        let body = self
            .get_text(
                &self.geo_url,
                &[
                    ("q", city.to_string()),
                    ("limit", "1".to_string()),
                    ("appid", self.api_key.clone()),
                ],
            )
            .await?;
        parse_geocode_response(&body)
    }

    async fn current_pollution(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<PollutionSnapshot, ProviderError> {
        let body = self
            .get_text(
                &self.pollution_url,
                &[
                    ("lat", latitude.to_string()),
                    ("lon", longitude.to_string()),
                    ("appid", self.api_key.clone()),
                ],
            )
            .await?;
        parse_pollution_response(&body)
    }
}

/// Take the first geocoding match, if any.
fn parse_geocode_response(body: &str) -> Result<Option<GeoLocation>, ProviderError> {
    let entries: Vec<GeoEntry> = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("geocoding: {}", e)))?;

    Ok(entries.into_iter().next().map(|e| GeoLocation {
        latitude: e.lat,
        longitude: e.lon,
        country: e
            .country
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "Unknown".to_string()),
    }))
}

/// Use only the first (most current) pollution entry.
fn parse_pollution_response(body: &str) -> Result<PollutionSnapshot, ProviderError> {
    let parsed: PollutionResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("air pollution: {}", e)))?;

    let entry = parsed
        .list
        .into_iter()
        .next()
        .ok_or(ProviderError::EmptyResponse)?;

    if !(1..=5).contains(&entry.main.aqi) {
        return Err(ProviderError::Malformed(format!(
            "AQI category {} outside 1-5",
            entry.main.aqi
        )));
    }

    let c = entry.components;
    Ok(PollutionSnapshot {
        aqi: entry.main.aqi,
        pollutants: Pollutants {
            co: c.co.max(0.0),
            no: c.no.max(0.0),
            no2: c.no2.max(0.0),
            o3: c.o3.max(0.0),
            so2: c.so2.max(0.0),
            pm25: c.pm25.max(0.0),
            pm10: c.pm10.max(0.0),
            nh3: c.nh3.max(0.0),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, timeout_secs: u64) -> OpenWeatherClient {
        OpenWeatherClient::new(&OpenWeatherConfig {
            api_key: "test-key".to_string(),
            geo_url: format!("{}/geo/1.0/direct", server.uri()),
            pollution_url: format!("{}/data/2.5/air_pollution", server.uri()),
            timeout_secs,
        })
    }

    #[test]
    fn test_parse_geocode_first_match() {
        let body = r#"[
            {"name": "Lahore", "lat": 31.5497, "lon": 74.3436, "country": "PK"},
            {"name": "Lahore", "lat": 1.0, "lon": 2.0, "country": "XX"}
        ]"#;
        let loc = parse_geocode_response(body).unwrap().unwrap();
        assert_eq!(loc.latitude, 31.5497);
        assert_eq!(loc.longitude, 74.3436);
        assert_eq!(loc.country, "PK");
    }

    #[test]
    fn test_parse_geocode_missing_country() {
        let loc = parse_geocode_response(r#"[{"lat": 10.0, "lon": 20.0}]"#)
            .unwrap()
            .unwrap();
        assert_eq!(loc.country, "Unknown");
    }

    #[test]
    fn test_parse_geocode_empty() {
        assert_eq!(parse_geocode_response("[]").unwrap(), None);
    }

    #[test]
    fn test_parse_geocode_malformed() {
        assert!(matches!(
            parse_geocode_response(r#"{"cod": 401}"#),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_pollution_uses_first_entry() {
        let body = r#"{
            "coord": {"lon": 74.3, "lat": 31.5},
            "list": [
                {"main": {"aqi": 4}, "components": {"co": 200.5, "no": 0.1, "no2": 12.0,
                 "o3": 30.2, "so2": 4.4, "pm2_5": 55.2, "pm10": 80.1, "nh3": 3.3}, "dt": 1760000000},
                {"main": {"aqi": 1}, "components": {"co": 1.0}, "dt": 1760003600}
            ]
        }"#;
        let snapshot = parse_pollution_response(body).unwrap();
        assert_eq!(snapshot.aqi, 4);
        assert_eq!(snapshot.pollutants.co, 200.5);
        assert_eq!(snapshot.pollutants.pm25, 55.2);
        assert_eq!(snapshot.pollutants.nh3, 3.3);
    }

    #[test]
    fn test_parse_pollution_missing_components_default_to_zero() {
        let body = r#"{"list": [{"main": {"aqi": 2}, "components": {"pm2_5": 8.5}}]}"#;
        let snapshot = parse_pollution_response(body).unwrap();
        assert_eq!(snapshot.pollutants.pm25, 8.5);
        assert_eq!(snapshot.pollutants.co, 0.0);
        assert_eq!(snapshot.pollutants.nh3, 0.0);
    }

    #[test]
    fn test_parse_pollution_empty_list() {
        assert!(matches!(
            parse_pollution_response(r#"{"list": []}"#),
            Err(ProviderError::EmptyResponse)
        ));
    }

    #[test]
    fn test_parse_pollution_out_of_range_category() {
        let body = r#"{"list": [{"main": {"aqi": 9}, "components": {}}]}"#;
        assert!(matches!(
            parse_pollution_response(body),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_geocode_sends_name_limit_and_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .and(query_param("q", "Lahore"))
            .and(query_param("limit", "1"))
            .and(query_param("appid", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"name": "Lahore", "lat": 31.5, "lon": 74.3, "country": "PK"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let loc = client_for(&server, 5).geocode("Lahore").await.unwrap().unwrap();
        assert_eq!(loc.latitude, 31.5);
        assert_eq!(loc.country, "PK");
    }

    #[tokio::test]
    async fn test_geocode_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client_for(&server, 5).geocode("Lahore").await.unwrap_err();
        assert!(matches!(err, ProviderError::Status(401)));
    }

    #[tokio::test]
    async fn test_current_pollution_sends_coordinates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/air_pollution"))
            .and(query_param("lat", "31.5"))
            .and(query_param("lon", "74.3"))
            .and(query_param("appid", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "list": [{"main": {"aqi": 3}, "components": {"pm2_5": 22.1, "pm10": 40.0}}]
            })))
            .mount(&server)
            .await;

        let snapshot = client_for(&server, 5)
            .current_pollution(31.5, 74.3)
            .await
            .unwrap();
        assert_eq!(snapshot.aqi, 3);
        assert_eq!(snapshot.pollutants.pm10, 40.0);
    }

    #[tokio::test]
    async fn test_current_pollution_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/air_pollution"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"list": []}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server, 1)
            .current_pollution(31.5, 74.3)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
    }
}
