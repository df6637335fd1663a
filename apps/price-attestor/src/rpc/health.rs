use axum::{routing::get, Json, Router};
use serde::Serialize;
use tracing::debug;

/// Serving status reported by the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServingStatus {
    Serving,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckResponse {
    pub status: ServingStatus,
}

/// Always SERVING: if we are responding, we are healthy.
pub async fn check() -> Json<HealthCheckResponse> {
    debug!("health check request received");
    Json(HealthCheckResponse {
        status: ServingStatus::Serving,
    })
}

/// Router exposing `GET /health`.
pub fn router() -> Router {
    Router::new().route("/health", get(check))
}
