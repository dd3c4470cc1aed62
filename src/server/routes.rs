//! Router configuration for the web server.

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let kinorium = Router::new()
        .route("/health", get(handlers::health))
        .route("/movies", get(handlers::list_movies))
        .route("/movie", get(handlers::movie_detail));

    Router::new()
        .nest("/v1/kinorium", kinorium)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
