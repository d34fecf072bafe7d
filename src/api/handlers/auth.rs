//! Handlers for registration, login and token refresh.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::auth::{LoginRequest, RegisterRequest, TokenResponse};
use crate::api::middleware::AuthContext;
use crate::domain::entities::AccountView;
use crate::error::AppError;
use crate::state::AppState;

/// Registers a new standard account.
///
/// # Endpoint
///
/// `POST /auth/register` (public)
///
/// # Request Body
///
/// ```json
/// { "name": "Alice", "email": "Alice@X.com", "password": "secret12" }
/// ```
///
/// # Errors
///
/// - 400 if name, email or password fail validation
/// - 409 if the normalized email is already registered
pub async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AccountView>), AppError> {
    let view = state.accounts.register(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Exchanges email and password for a bearer token.
///
/// # Endpoint
///
/// `POST /auth/login` (public)
///
/// # Errors
///
/// - 401 `INVALID_CREDENTIALS` for an unknown email or a wrong password
pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let session = state.accounts.authenticate(payload.into()).await?;
    Ok(Json(session.into()))
}

/// Issues a fresh token for the authenticated caller.
///
/// # Endpoint
///
/// `POST /auth/refresh` (Bearer token required)
///
/// Previously issued tokens remain valid until they expire.
pub async fn refresh_handler(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<TokenResponse>, AppError> {
    let session = state.accounts.refresh_token(&auth.account_id).await?;
    Ok(Json(session.into()))
}
