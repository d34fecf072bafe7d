//! Business logic services for the application layer.

pub mod account_service;
pub mod cached_account_service;
pub mod token_service;

pub use account_service::{
    AccountManager, AccountPage, AccountService, AuthSession, Credentials, ProfileUpdate,
    Registration,
};
pub use cached_account_service::CachedAccountService;
pub use token_service::{
    JwtTokenService, MAX_TOKEN_LIFETIME, TOKEN_ISSUER, TokenError, TokenService,
};
