// Air Quality API v0.1
use axum::{routing::get, Router};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod db;
mod errors;
mod helpers;
mod routes;
mod services;

use config::AppConfig;
use db::store::PgStore;
use routes::AppState;
use services::openweather::OpenWeatherClient;

/// Maximum number of connections in the database pool.
const DB_POOL_MAX_CONNECTIONS: u32 = 5;
/// Minimum number of connections kept alive in the database pool.
const DB_POOL_MIN_CONNECTIONS: u32 = 2;

/// OpenAPI document for the Air Quality API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Air Quality API",
        version = "0.1.0",
        description = "Current and historical air-quality readings for named cities. \
            Geocodes cities on first use, stores every pollutant snapshot fetched from \
            OpenWeather, raises threshold alerts for poor air, and produces a naive \
            seven-day AQI forecast from recent history.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "AQI", description = "Current and historical readings"),
        (name = "Forecast", description = "Seven-day AQI forecast"),
        (name = "Alerts", description = "Threshold alerts"),
        (name = "Cities", description = "Known cities"),
    ),
    paths(
        routes::health::health_check,
        routes::aqi::get_current_aqi,
        routes::aqi::get_historical,
        routes::forecast::get_forecast,
        routes::alerts::get_alerts,
        routes::cities::list_cities,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::aqi::AqiSnapshotResponse,
            routes::aqi::HistoryPoint,
            routes::forecast::ForecastEntry,
            routes::alerts::AlertResponse,
            routes::cities::CityResponse,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "air_quality_api=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // Set up database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(DB_POOL_MAX_CONNECTIONS)
        .min_connections(DB_POOL_MIN_CONNECTIONS)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    let forecast_rng = match config.forecast_seed {
        Some(seed) => {
            tracing::info!("Forecast RNG seeded with {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_os_rng(),
    };

    let app_state = AppState {
        store: Arc::new(PgStore::new(pool.clone())),
        provider: Arc::new(OpenWeatherClient::new(&config.openweather)),
        forecast_rng: Arc::new(Mutex::new(forecast_rng)),
        alert_cooldown: chrono::Duration::minutes(config.alert_cooldown_minutes.max(0)),
        default_city: config.default_city.clone(),
    };

    // CORS: read-only API, restrict methods to GET
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/api/aqi/", get(routes::aqi::get_current_aqi))
        .route("/api/historical/", get(routes::aqi::get_historical))
        .route("/api/forecast/", get(routes::forecast::get_forecast))
        .route("/api/alerts/", get(routes::alerts::get_alerts))
        .route("/api/cities/", get(routes::cities::list_cities))
        .with_state(app_state);

    // Health check uses PgPool to verify DB connectivity
    let health_routes = Router::new()
        .route("/api/health", get(routes::health::health_check))
        .with_state(pool);

    let app = Router::new()
        .merge(health_routes)
        .merge(api_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
