//! HTTP server setup and configuration.
//!
//! This module provides the router and application state used by both
//! the preview server and integration tests.

use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::models::AppConfig;
use crate::services::InMemorySessionRegistry;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: Arc<InMemorySessionRegistry>,
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<InMemorySessionRegistry> {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

/// Create application state from a loaded configuration.
pub fn create_app_state(config: AppConfig) -> AppState {
    let sessions = InMemorySessionRegistry::with_limits(
        Duration::from_secs(config.session_idle_secs),
        config.max_sessions,
    );
    AppState {
        config: Arc::new(config),
        sessions: Arc::new(sessions),
    }
}

/// Build the router with all endpoints and middleware.
pub fn build_router(state: AppState) -> Router {
    type Sessions = InMemorySessionRegistry;

    Router::new()
        // Control page
        .route("/", get(api::handle_index))
        // Preview sessions
        .route("/api/sessions", post(api::handle_create_session::<Sessions>))
        .route(
            "/api/sessions/:id",
            get(api::handle_get_session::<Sessions>).delete(api::handle_delete_session::<Sessions>),
        )
        .route("/api/sessions/:id/preview", get(api::handle_preview::<Sessions>))
        .route("/api/sessions/:id/save", post(api::handle_save::<Sessions>))
        // OpenAPI document
        .route("/api-docs/openapi.json", get(api::handle_openapi))
        // Health check
        .route("/health", get(|| async { "OK" }))
        // Add state and tracing
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
