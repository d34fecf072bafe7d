//! Bearer token issuance and validation.

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::domain::entities::{Account, TokenClaims};
use crate::error::AppError;

/// Issuer written into and required from every token.
pub const TOKEN_ISSUER: &str = "user-accounts";

/// Longest lifetime a token may be issued with.
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token is invalid: {0}")]
    Invalid(String),
    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => {
                AppError::invalid_token("Token has expired", json!({ "reason": "expired" }))
            }
            TokenError::Invalid(reason) => {
                AppError::invalid_token("Invalid token", json!({ "reason": reason }))
            }
            TokenError::Signing(reason) => {
                AppError::internal("Failed to issue token", json!({ "reason": reason }))
            }
        }
    }
}

/// Issues and validates signed bearer tokens.
///
/// Validation is purely cryptographic: no account lookup happens, so a
/// token stays valid until expiry even if its account changes role or is
/// deleted.
pub trait TokenService: Send + Sync {
    /// Signs a token for `account` expiring after [`TokenService::lifetime`].
    fn issue(&self, account: &Account) -> Result<String, TokenError>;

    /// Verifies signature, algorithm, issuer and expiry, returning the claims.
    fn validate(&self, token: &str) -> Result<TokenClaims, TokenError>;

    /// Lifetime applied to newly issued tokens.
    fn lifetime(&self) -> Duration;
}

/// HS256 JWT implementation of [`TokenService`].
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl JwtTokenService {
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetime,
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, account: &Account) -> Result<String, TokenError> {
        let iat = Utc::now().timestamp();
        let exp = i64::try_from(self.lifetime.as_secs())
            .ok()
            .and_then(|secs| iat.checked_add(secs))
            .ok_or_else(|| TokenError::Signing("token lifetime out of range".to_string()))?;
        let claims = TokenClaims {
            sub: account.id.clone(),
            email: account.email.clone(),
            role: account.role,
            iat,
            exp,
            iss: TOKEN_ISSUER.to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn validate(&self, token: &str) -> Result<TokenClaims, TokenError> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => {
                    tracing::debug!(component = "token_service", error = %e, "token rejected");
                    TokenError::Invalid(e.to_string())
                }
            })
    }

    fn lifetime(&self) -> Duration {
        self.lifetime
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Role;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn service() -> JwtTokenService {
        JwtTokenService::new(SECRET, Duration::from_secs(3600))
    }

    fn account() -> Account {
        let now = Utc::now();
        Account {
            id: "7".to_string(),
            name: "Alice".to_string(),
            email: "alice@x.com".to_string(),
            password_hash: "hash".to_string(),
            role: Role::Admin,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_round_trip() {
        let svc = service();
        let token = svc.issue(&account()).unwrap();
        let claims = svc.validate(&token).unwrap();

        assert_eq!(claims.sub, "7");
        assert_eq!(claims.email, "alice@x.com");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_out_of_range_lifetime_fails_instead_of_overflowing() {
        for secs in [u64::MAX, i64::MAX as u64] {
            let svc = JwtTokenService::new(SECRET, Duration::from_secs(secs));
            let err = svc.issue(&account()).unwrap_err();

            assert!(matches!(err, TokenError::Signing(_)));
            assert!(matches!(AppError::from(err), AppError::Internal { .. }));
        }
    }

    #[test]
    fn test_flipped_signature_byte_is_rejected() {
        let svc = service();
        let token = svc.issue(&account()).unwrap();

        let (signed, signature) = token.rsplit_once('.').unwrap();
        let mut bytes = URL_SAFE_NO_PAD.decode(signature).unwrap();
        bytes[0] ^= 0x01;
        let tampered = format!("{}.{}", signed, URL_SAFE_NO_PAD.encode(bytes));

        let err = svc.validate(&tampered).unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
        assert!(matches!(AppError::from(err), AppError::InvalidToken { .. }));
    }

    #[test]
    fn test_other_secret_is_rejected() {
        let token = service().issue(&account()).unwrap();
        let other = JwtTokenService::new(b"ffffffffffffffffffffffffffffffff", Duration::from_secs(60));
        assert!(matches!(other.validate(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: "7".to_string(),
            email: "alice@x.com".to_string(),
            role: Role::Standard,
            iat: now - 120,
            exp: now - 60,
            iss: TOKEN_ISSUER.to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(matches!(service().validate(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_other_algorithm_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: "7".to_string(),
            email: "alice@x.com".to_string(),
            role: Role::Admin,
            iat: now,
            exp: now + 600,
            iss: TOKEN_ISSUER.to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(matches!(service().validate(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(service().validate("not.a.token").is_err());
        assert!(service().validate("").is_err());
    }
}
