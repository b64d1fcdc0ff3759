//! Liveness endpoint for the review server
//!
//! Reports that the process is serving HTTP along with its package version.
//! Store availability is surfaced by the word endpoints, not here.

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Body of `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "lcards-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Routes merged into the top-level router, outside `/v1`
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
