//! Health check endpoint

use axum::{routing::get, Json, Router};
use serde::Serialize;
use vocab_common::time;

use crate::AppState;

/// Module name reported by `/health`
pub const MODULE_NAME: &str = "vocab-server";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub timestamp: String,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: MODULE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: time::now_rfc3339(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
