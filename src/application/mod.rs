//! Application layer services implementing business logic.
//!
//! Services validate input, coordinate repository calls and issue tokens.
//! Handlers only see the [`services::AccountService`] trait, so the cache-aside
//! decorator can be slotted in without them noticing.
//!
//! # Available Services
//!
//! - [`services::AccountManager`] - Repository-backed account lifecycle
//! - [`services::CachedAccountService`] - Cache-aside decorator
//! - [`services::JwtTokenService`] - HS256 bearer token issuance and validation

pub mod services;
