use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::response::ApiResponse;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthView {
    pub status: &'static str,
    pub database: bool,
    pub version: &'static str,
}

/// Liveness plus a `SELECT 1` against the pool. 503 when the database
/// does not answer.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthView>>) {
    let database = state.db.health_check().await;

    let (code, status) = if database {
        (StatusCode::OK, "ok")
    } else {
        tracing::warn!("Health check failed: database unreachable");
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(ApiResponse::ok(HealthView {
            status,
            database,
            version: env!("CARGO_PKG_VERSION"),
        })),
    )
}
