//! DTOs for profile and account administration endpoints.

use serde::{Deserialize, Serialize};

use crate::application::services::{AccountPage, ProfileUpdate};
use crate::domain::entities::AccountView;

/// Request body for `PUT /api/v1/profile`.
///
/// All fields are optional; only provided fields are changed. Roles cannot
/// be changed through this endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        ProfileUpdate {
            name: req.name,
            email: req.email,
            role: None,
        }
    }
}

/// Response for `GET /api/v1/admin/users`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountListResponse {
    pub users: Vec<AccountView>,
    pub total: u64,
    pub limit: usize,
    pub offset: usize,
}

impl From<AccountPage> for AccountListResponse {
    fn from(page: AccountPage) -> Self {
        Self {
            users: page.accounts,
            total: page.total,
            limit: page.limit,
            offset: page.offset,
        }
    }
}

/// Response for `POST /api/v1/admin/cache/purge`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CachePurgeResponse {
    pub removed: u64,
}
