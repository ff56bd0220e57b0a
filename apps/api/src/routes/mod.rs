pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/matches", post(handlers::handle_match))
        .route("/api/v1/runs", post(handlers::handle_start_run))
        .route("/api/v1/runs/:id", get(handlers::handle_get_run))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
