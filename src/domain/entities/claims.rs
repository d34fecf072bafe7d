//! Bearer token claims.

use serde::{Deserialize, Serialize};

use super::Role;

/// Claims embedded in every issued token.
///
/// Tokens are self-contained: nothing here is checked against the account
/// store on validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Account identifier.
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    pub iss: String,
}
