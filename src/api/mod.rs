//! HTTP API module
//!
//! The control surface a presentation layer or notification action uses to
//! drive the countdown.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/toggle", post(toggle_handler))
        .route("/reset", post(reset_handler))
        .route("/total", post(total_handler))
        .route("/set-max", post(set_max_handler))
        .route("/clear-today", post(clear_today_handler))
        .route("/save", post(save_handler))
        .route("/lifecycle/background", post(background_handler))
        .route("/lifecycle/foreground", post(foreground_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
