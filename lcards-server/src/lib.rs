//! lcards-server library - Leitner-box review backend
//!
//! The binary wires these pieces together; integration tests build the same
//! router against a temporary database.

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod ingest;
pub mod jobs;
pub mod service;

use service::ReviewService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ReviewService>,
}

impl AppState {
    pub fn new(service: Arc<ReviewService>) -> Self {
        Self { service }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post, put};

    let v1 = Router::new()
        .route("/v1/words", get(api::list_words))
        .route("/v1/words/daily", get(api::daily_words))
        .route("/v1/words/category/:category", get(api::words_by_category))
        .route("/v1/words/tag/:tag", get(api::words_by_tag))
        .route("/v1/words/update/:word_id", put(api::update_word))
        .route("/v1/sync", post(api::sync_words));

    Router::new()
        .merge(v1)
        .merge(api::health_routes())
        .route("/build_info", get(api::get_build_info))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
