//! Handlers for the caller's own profile.

use axum::{Json, extract::State};

use crate::api::dto::account::UpdateProfileRequest;
use crate::api::middleware::AuthContext;
use crate::domain::entities::AccountView;
use crate::error::AppError;
use crate::state::AppState;

/// `GET /api/v1/profile`
pub async fn get_profile_handler(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<AccountView>, AppError> {
    Ok(Json(state.accounts.get_profile(&auth.account_id).await?))
}

/// Updates name and/or email of the caller's account.
///
/// # Endpoint
///
/// `PUT /api/v1/profile`
///
/// # Errors
///
/// - 400 on invalid name or email
/// - 409 if the new email belongs to another account
pub async fn update_profile_handler(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<AccountView>, AppError> {
    let view = state
        .accounts
        .update_profile(&auth.account_id, payload.into())
        .await?;
    Ok(Json(view))
}
