//! HTTP and WebSocket routes.

pub mod health;
pub mod ws;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full router.
pub fn app(state: AppState) -> Router {
    // Browser clients are served from a different origin.
    Router::new()
        .merge(health::router())
        .merge(ws::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
