//! stead server library logic.

pub mod api;
pub mod api_properties;
pub mod api_users;
pub mod config;
pub mod middleware;
pub mod seed;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post, put},
    Extension, Router,
};
use std::sync::Arc;
use stead_db::DbPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool. One checkout per request, inside
    /// `spawn_blocking`; the guard returns the connection on drop.
    pub pool: DbPool,
}

/// Maximum request body size (1 MiB). Protects against OOM from oversized
/// payloads.
const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    // Every route in this group mutates user-owned data and needs a caller
    // identity; the unauthenticated reads stay outside it.
    let protected_routes = Router::new()
        .route("/users/{userId}", patch(api_users::update_user_handler))
        .route("/properties", post(api_properties::create_property_handler))
        .route(
            "/properties/{propertyId}",
            put(api_properties::update_property_handler)
                .patch(api_properties::update_property_handler)
                .delete(api_properties::delete_property_handler),
        )
        .layer(axum::middleware::from_fn(middleware::identity_middleware));

    Router::new()
        .route("/", get(api::index_handler))
        .route("/health", get(api::health_handler))
        .route(
            "/users",
            post(api_users::create_user_handler).get(api_users::list_users_handler),
        )
        .route("/users/{userId}", get(api_users::get_user_handler))
        .route("/properties", get(api_properties::list_properties_handler))
        .route(
            "/properties/{propertyId}",
            get(api_properties::get_property_handler),
        )
        .merge(protected_routes)
        .fallback(api::fallback_handler)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
