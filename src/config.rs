/// Default geocoding endpoint (OpenWeather Geocoding API).
const DEFAULT_GEO_URL: &str = "http://api.openweathermap.org/geo/1.0/direct";
/// Default current air-pollution endpoint (OpenWeather Air Pollution API).
const DEFAULT_POLLUTION_URL: &str = "http://api.openweathermap.org/data/2.5/air_pollution";

/// Credentials and endpoints for the OpenWeather provider client.
#[derive(Debug, Clone)]
pub struct OpenWeatherConfig {
    pub api_key: String,
    pub geo_url: String,
    pub pollution_url: String,
    /// Per-request timeout for provider calls.
    pub timeout_secs: u64,
}

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub openweather: OpenWeatherConfig,
    pub port: u16,
    /// City used when a request omits the `city` query parameter.
    pub default_city: String,
    /// Window in which a repeated alert of the same severity is suppressed. 0 disables.
    pub alert_cooldown_minutes: i64,
    /// Fixed seed for the forecast RNG; `None` seeds from the OS.
    pub forecast_seed: Option<u64>,
    /// Emit JSON log lines instead of human-readable text.
    pub log_json: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            openweather: OpenWeatherConfig {
                api_key: std::env::var("OPENWEATHER_API_KEY")
                    .expect("OPENWEATHER_API_KEY must be set"),
                geo_url: std::env::var("OPENWEATHER_GEO_URL")
                    .unwrap_or_else(|_| DEFAULT_GEO_URL.to_string()),
                pollution_url: std::env::var("OPENWEATHER_POLLUTION_URL")
                    .unwrap_or_else(|_| DEFAULT_POLLUTION_URL.to_string()),
                timeout_secs: std::env::var("PROVIDER_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .expect("PROVIDER_TIMEOUT_SECS must be a valid u64"),
            },
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a valid u16"),
            default_city: std::env::var("DEFAULT_CITY").unwrap_or_else(|_| "Lahore".to_string()),
            alert_cooldown_minutes: std::env::var("ALERT_COOLDOWN_MINUTES")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .expect("ALERT_COOLDOWN_MINUTES must be a non-negative integer"),
            forecast_seed: std::env::var("FORECAST_SEED").ok().map(|s| {
                s.parse()
                    .expect("FORECAST_SEED must be a valid u64 when set")
            }),
            log_json: std::env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }
}
