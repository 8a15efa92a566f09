// HTTP routes: thin transport around the ingest / report service

mod auth;
mod http;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::history_repo::HistoryRepo;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) history_repo: Arc<HistoryRepo>,
    pub(crate) config: AppConfig,
}

pub fn app(history_repo: Arc<HistoryRepo>, config: AppConfig) -> Router {
    let body_limit = config.upload.max_bytes;
    let state = AppState {
        history_repo,
        config,
    };
    // Trailing-slash variants are the paths the original web and desktop clients call.
    Router::new()
        .route("/", get(|| async { "Equipment report service" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/upload", post(http::upload_handler)) // POST /api/upload
        .route("/api/upload/", post(http::upload_handler))
        .route("/api/report", get(http::report_handler)) // GET /api/report
        .route("/api/report/", get(http::report_handler))
        .route("/api/history", get(http::history_handler)) // GET /api/history
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
