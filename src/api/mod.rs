//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod events;
pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use events::events_handler;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/start", post(start_handler))
        .route("/stop", post(stop_handler))
        .route("/reset", post(reset_handler))
        .route("/toggle", post(toggle_handler))
        .route("/status", get(status_handler))
        .route("/events", get(events_handler))
        .route("/achievements", get(achievements_handler))
        .route("/stats", get(stats_handler))
        .route("/history", get(history_handler))
        .route("/premium", get(premium_handler))
        .route("/premium/unlock", post(unlock_handler))
        .route("/premium/purchase", post(purchase_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
