//! API route configuration.
//!
//! Authentication is applied once at the top level by
//! [`crate::api::middleware::auth::layer`]; admin routes additionally pass
//! through [`crate::api::middleware::auth::require_role`].

use crate::api::handlers::{
    delete_account_handler, get_account_handler, get_profile_handler, list_accounts_handler,
    login_handler, purge_cache_handler, refresh_handler, register_handler, update_profile_handler,
};
use crate::api::middleware::auth;
use crate::domain::entities::Role;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Registration, login and token refresh.
///
/// # Endpoints
///
/// - `POST /auth/register` - Create a standard account (public)
/// - `POST /auth/login`    - Exchange credentials for a token (public)
/// - `POST /auth/refresh`  - Issue a fresh token for the caller
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/refresh", post(refresh_handler))
}

/// Routes available to any authenticated account.
///
/// # Endpoints
///
/// - `GET /profile` - The caller's account
/// - `PUT /profile` - Update the caller's name and/or email
pub fn protected_routes() -> Router<AppState> {
    Router::new().route(
        "/profile",
        get(get_profile_handler).put(update_profile_handler),
    )
}

/// Routes restricted to [`Role::Admin`].
///
/// # Endpoints
///
/// - `GET    /users`        - Paginated account list
/// - `GET    /users/{id}`   - Single account
/// - `DELETE /users/{id}`   - Delete an account
/// - `POST   /cache/purge`  - Drop all cached account projections
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_accounts_handler))
        .route(
            "/users/{id}",
            get(get_account_handler).delete(delete_account_handler),
        )
        .route("/cache/purge", post(purge_cache_handler))
        .route_layer(middleware::from_fn_with_state(
            Role::Admin,
            auth::require_role,
        ))
}
