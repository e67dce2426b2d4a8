use axum::extract::State;
use axum::Json;
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" when healthy, "degraded" when the database is unreachable
    pub status: String,
    /// API version
    pub version: String,
    /// Whether the database answered a trivial query
    pub database: bool,
}

impl HealthResponse {
    fn from_db_status(db_ok: bool) -> Self {
        Self {
            status: if db_ok { "ok" } else { "degraded" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: db_ok,
        }
    }
}

/// Health check endpoint.
///
/// Always 200; a failed `SELECT 1` reports status "degraded" so load
/// balancers can tell a partial failure from a dead process.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service status", body = HealthResponse),
    )
)]
pub async fn health_check(State(pool): State<PgPool>) -> Json<HealthResponse> {
    let db_ok = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&pool)
        .await
        .is_ok();

    Json(HealthResponse::from_db_status(db_ok))
}
