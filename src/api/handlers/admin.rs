//! Admin-only account management handlers.
//!
//! Mounted under `/api/v1/admin` behind [`crate::api::middleware::auth::require_role`].

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::api::dto::account::{AccountListResponse, CachePurgeResponse};
use crate::api::dto::pagination::ListParams;
use crate::api::middleware::AuthContext;
use crate::domain::entities::AccountView;
use crate::error::AppError;
use crate::state::AppState;

/// Lists accounts, newest first.
///
/// # Endpoint
///
/// `GET /api/v1/admin/users?limit=10&offset=0`
///
/// `limit` defaults to 10 and is capped at 100; negative offsets count as 0.
pub async fn list_accounts_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<AccountListResponse>, AppError> {
    let (limit, offset) = params.limit_offset();
    let page = state.accounts.list(limit, offset).await?;
    Ok(Json(page.into()))
}

/// `GET /api/v1/admin/users/{id}`
pub async fn get_account_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AccountView>, AppError> {
    Ok(Json(state.accounts.get_by_id(&id).await?))
}

/// Deletes an account and its cached projection.
///
/// # Endpoint
///
/// `DELETE /api/v1/admin/users/{id}`
///
/// Tokens already issued to the account stay valid until they expire.
pub async fn delete_account_handler(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.accounts.delete(&id).await?;
    tracing::info!(
        component = "admin",
        account_id = %id,
        deleted_by = %auth.account_id,
        "account deleted by admin"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// Drops every cached account projection.
///
/// # Endpoint
///
/// `POST /api/v1/admin/cache/purge`
///
/// Best-effort: reports `removed: 0` when caching is disabled or the cache
/// is unreachable.
pub async fn purge_cache_handler(State(state): State<AppState>) -> Json<CachePurgeResponse> {
    Json(CachePurgeResponse {
        removed: state.purge_cache().await,
    })
}
