//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    response::IntoResponse,
    routing::get,
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::{auth_middleware, track_metrics};
use crate::presentation::websocket::ws_handler;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/chat", chat_routes(state.clone()))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn(track_metrics))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// Chat routes (protected)
///
/// `/{id}` is a group id for the WebSocket upgrade and a message token for
/// deletion.
fn chat_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(ws_handler).delete(handlers::chat::delete_message),
        )
        .route("/{id}/messages", get(handlers::chat::get_messages))
        .route("/{id}/users", get(handlers::chat::get_group_users))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
