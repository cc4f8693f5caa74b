//! HTTP API module
//! 
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timers", get(list_timers_handler))
        .route("/timers/:id", get(get_timer_handler))
        .route("/timers/:id/start", post(start_handler))
        .route("/timers/:id/pause", post(pause_handler))
        .route("/timers/:id/toggle", post(toggle_handler))
        .route("/timers/:id/reset", post(reset_handler))
        .route("/timers/:id/stop", post(stop_handler))
        .route("/timers/:id/config", put(config_handler))
        .route("/active/:id", post(select_handler))
        .route("/theme/toggle", post(theme_toggle_handler))
        .route("/presentation/toggle", post(presentation_toggle_handler))
        .route("/shortcut/:key", post(shortcut_handler))
        .route("/events", get(events_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
