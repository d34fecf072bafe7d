//! Bearer token authentication and role authorization middleware.
//!
//! Every request passes through [`layer`], which resolves to one of the
//! [`AuthOutcome`] states. Routes that need a role additionally pass through
//! [`require_role`].

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use serde_json::json;

use crate::application::services::TokenService;
use crate::domain::entities::Role;
use crate::error::AppError;
use crate::state::AppState;

/// Paths served without a token.
pub const PUBLIC_PATHS: &[&str] = &["/health", "/auth/register", "/auth/login"];

/// Identity of the authenticated caller, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub account_id: String,
    pub email: String,
    pub role: Role,
}

/// Result of evaluating a request against the auth rules.
#[derive(Debug)]
pub enum AuthOutcome {
    /// Path is on the allow-list; no token was examined.
    Skipped,
    /// Missing, malformed, invalid or expired token.
    Rejected(AppError),
    /// Authenticated, but lacking the required role.
    Forbidden(AppError),
    /// Authenticated (and, for role checks, carrying the required role).
    Authorized(AuthContext),
}

pub fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

/// Authenticates a request given its path and extracted bearer token.
///
/// `bearer` is `None` when the `Authorization` header is absent or not of
/// the form `Bearer <token>`.
pub fn authenticate(path: &str, bearer: Option<&str>, tokens: &dyn TokenService) -> AuthOutcome {
    if is_public(path) {
        return AuthOutcome::Skipped;
    }

    let Some(token) = bearer.filter(|t| !t.trim().is_empty()) else {
        return AuthOutcome::Rejected(AppError::unauthorized(
            "Unauthorized",
            json!({ "reason": "Authorization header is missing or invalid" }),
        ));
    };

    match tokens.validate(token) {
        Ok(claims) => AuthOutcome::Authorized(AuthContext {
            account_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }),
        Err(e) => AuthOutcome::Rejected(e.into()),
    }
}

/// Checks an authenticated caller against a required role.
pub fn authorize(context: Option<&AuthContext>, required: Role) -> AuthOutcome {
    match context {
        Some(ctx) if ctx.role == required => AuthOutcome::Authorized(ctx.clone()),
        Some(ctx) => AuthOutcome::Forbidden(AppError::forbidden(
            "Insufficient permissions",
            json!({ "required_role": required, "role": ctx.role }),
        )),
        None => AuthOutcome::Forbidden(AppError::forbidden(
            "Insufficient permissions",
            json!({ "required_role": required }),
        )),
    }
}

/// Authenticates requests using Bearer tokens from the Authorization header.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// Allow-listed paths ([`PUBLIC_PATHS`]) pass through untouched. For every
/// other path the token is validated and an [`AuthContext`] is inserted into
/// the request extensions.
///
/// # Errors
///
/// Returns `401 Unauthorized` if the header is missing or malformed, or the
/// token is invalid or expired. 401 responses carry `WWW-Authenticate: Bearer`.
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path().to_owned();
    if is_public(&path) {
        return Ok(next.run(req).await);
    }

    let (mut parts, body) = req.into_parts();

    let bearer = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .ok()
        .map(|AuthBearer(token)| token);

    match authenticate(&path, bearer.as_deref(), st.tokens.as_ref()) {
        AuthOutcome::Skipped => Ok(next.run(Request::from_parts(parts, body)).await),
        AuthOutcome::Authorized(context) => {
            tracing::debug!(
                component = "auth",
                account_id = %context.account_id,
                role = %context.role,
                "request authenticated"
            );
            parts.extensions.insert(context);
            Ok(next.run(Request::from_parts(parts, body)).await)
        }
        AuthOutcome::Rejected(e) | AuthOutcome::Forbidden(e) => Err(e),
    }
}

/// Rejects callers whose role differs from the one held in state.
///
/// ```rust,ignore
/// let admin = Router::new()
///     .route("/users", get(list_accounts_handler))
///     .route_layer(middleware::from_fn_with_state(Role::Admin, auth::require_role));
/// ```
///
/// # Errors
///
/// Returns `403 Forbidden` when no [`AuthContext`] is present or its role
/// does not match.
pub async fn require_role(
    State(required): State<Role>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    match authorize(req.extensions().get::<AuthContext>(), required) {
        AuthOutcome::Authorized(_) | AuthOutcome::Skipped => Ok(next.run(req).await),
        AuthOutcome::Forbidden(e) | AuthOutcome::Rejected(e) => {
            tracing::debug!(component = "auth", required = %required, "role check failed");
            Err(e)
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthContext>().cloned().ok_or_else(|| {
            AppError::unauthorized(
                "Unauthorized",
                json!({ "reason": "Request is not authenticated" }),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::JwtTokenService;
    use crate::domain::entities::Account;
    use chrono::Utc;
    use std::time::Duration;

    fn tokens() -> JwtTokenService {
        JwtTokenService::new(b"0123456789abcdef0123456789abcdef", Duration::from_secs(60))
    }

    fn token_for(role: Role) -> String {
        let now = Utc::now();
        tokens()
            .issue(&Account {
                id: "5".to_string(),
                name: "Bob".to_string(),
                email: "bob@x.com".to_string(),
                password_hash: "hash".to_string(),
                role,
                created_at: now,
                updated_at: now,
            })
            .unwrap()
    }

    #[test]
    fn test_public_paths_are_skipped() {
        for path in PUBLIC_PATHS {
            assert!(matches!(
                authenticate(path, None, &tokens()),
                AuthOutcome::Skipped
            ));
        }
    }

    #[test]
    fn test_missing_token_is_rejected() {
        match authenticate("/api/v1/profile", None, &tokens()) {
            AuthOutcome::Rejected(e) => assert_eq!(e.code(), "UNAUTHORIZED"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_token_is_rejected() {
        match authenticate("/api/v1/profile", Some("garbage"), &tokens()) {
            AuthOutcome::Rejected(e) => assert_eq!(e.code(), "INVALID_TOKEN"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_valid_token_yields_context() {
        let token = token_for(Role::Standard);
        match authenticate("/api/v1/profile", Some(&token), &tokens()) {
            AuthOutcome::Authorized(ctx) => {
                assert_eq!(ctx.account_id, "5");
                assert_eq!(ctx.email, "bob@x.com");
                assert_eq!(ctx.role, Role::Standard);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_role_mismatch_is_forbidden() {
        let ctx = AuthContext {
            account_id: "5".to_string(),
            email: "bob@x.com".to_string(),
            role: Role::Standard,
        };

        assert!(matches!(
            authorize(Some(&ctx), Role::Admin),
            AuthOutcome::Forbidden(_)
        ));
        assert!(matches!(
            authorize(None, Role::Admin),
            AuthOutcome::Forbidden(_)
        ));
        assert!(matches!(
            authorize(Some(&ctx), Role::Standard),
            AuthOutcome::Authorized(_)
        ));
    }
}
