use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use super::middleware::metrics_middleware;
use super::{browse, handlers, watched};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Front-end static files path (configurable via env)
    let static_dir =
        std::env::var("POPCORN_STATIC_DIR").unwrap_or_else(|_| "web/dist".to_string());

    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Browsing
        .route("/state", get(browse::get_state))
        .route("/query", put(browse::set_query))
        .route("/select/{id}", post(browse::select))
        .route("/close", post(browse::close))
        .route("/rating", put(browse::set_rating))
        .route("/keys", post(browse::key))
        // Watched list
        .route("/watched", get(watched::list_watched))
        .route("/watched", post(watched::add_watched))
        .route("/watched/{id}", delete(watched::delete_watched))
        .with_state(Arc::clone(&state));

    // Serve front-end with SPA fallback
    let index_path = format!("{}/index.html", static_dir);
    let serve_dir = ServeDir::new(&static_dir).fallback(ServeFile::new(&index_path));

    Router::new()
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .nest("/api/v1", api_routes)
        .fallback_service(serve_dir)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
