//! Axum router construction for the occurrence API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the occurrence server.
///
/// CORS is configured to allow any origin for development. In
/// production this should be restricted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Axum caps request bodies at 2 MiB by default, well under the
    // photo allowance; raise it to cover a full creation request.
    let body_limit = DefaultBodyLimit::max(state.uploads.body_limit());

    Router::new()
        // WebSocket
        .route("/ws/occurrences", get(ws::ws_occurrences))
        // REST API
        .route("/api/health", get(handlers::health))
        .route(
            "/api/occurrences",
            get(handlers::list_occurrences).post(handlers::create_occurrence),
        )
        .route("/api/occurrences/stats", get(handlers::get_stats))
        .route(
            "/api/occurrences/{id}",
            get(handlers::get_occurrence)
                .put(handlers::update_occurrence)
                .delete(handlers::delete_occurrence),
        )
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
