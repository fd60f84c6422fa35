pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::enhance::handlers as enhance;
use crate::extract::handlers as extract;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/templates", get(enhance::handle_list_templates))
        .route("/api/v1/extract", post(extract::handle_extract))
        .route("/api/v1/enhance", post(enhance::handle_enhance))
        .route("/api/v1/render", post(enhance::handle_render))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
