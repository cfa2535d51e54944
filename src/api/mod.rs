//! HTTP API module
//!
//! Local control surface for the countdown: commands, status and
//! preferences. This module contains the endpoint handlers and response
//! structures.

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
        .route("/start", post(start_handler))
        .route("/stop", post(stop_handler))
        .route("/pause", post(pause_handler))
        .route("/resume", post(resume_handler))
        .route("/dismiss", post(dismiss_handler))
        .route("/restart", post(restart_handler))
        .route("/notification-clicked", post(notification_clicked_handler))
        .route("/quit", post(quit_handler))
        .route("/status", get(status_handler))
        .route("/preferences", get(preferences_handler))
        .route(
            "/preferences/:key",
            get(get_preference_handler).put(set_preference_handler),
        )
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
