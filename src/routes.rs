//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`          - Repository and cache health (public)
//! - `/auth/*`               - Registration, login (public) and refresh
//! - `/api/v1/profile`       - Caller's own account (Bearer token required)
//! - `/api/v1/admin/*`       - Account administration (admin role required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Authentication** - Bearer token on every route except the public ones
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::{auth, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Builds the routed application without path normalization.
///
/// Authentication is a `route_layer`, so requests to unknown paths get a
/// plain 404 instead of 401.
pub fn router(state: AppState) -> Router {
    let api_router = api::routes::protected_routes().nest("/admin", api::routes::admin_routes());

    Router::new()
        .route("/health", get(health_handler))
        .nest("/auth", api::routes::auth_routes())
        .nest("/api/v1", api_router)
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .with_state(state)
        .layer(tracing::layer())
}

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}
