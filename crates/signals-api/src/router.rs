//! Route table.

use crate::handlers;
use crate::middleware::cors;
use crate::state::AppState;
use axum::handler::HandlerWithoutStateExt;
use axum::routing::{any, get};
use axum::{middleware, Router};
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the HTTP router.
///
/// Paths outside `/api` are served from `public_dir` when given, otherwise
/// answered with a JSON 404.
pub fn create_router(state: Arc<AppState>, public_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .route(
            "/api/health",
            get(handlers::health).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/signals",
            get(handlers::signals).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/portfolio",
            get(handlers::portfolio).fallback(handlers::method_not_allowed),
        )
        .route("/api/subscribe", any(handlers::subscribe));

    let routes = match public_dir {
        Some(dir) => api.fallback_service(
            ServeDir::new(dir).not_found_service(handlers::not_found.into_service()),
        ),
        None => api.fallback(handlers::not_found),
    };

    routes
        .layer(middleware::from_fn(cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
