//! # User Accounts
//!
//! A user account service built with Axum: registration, login, profile
//! management and admin operations, with pluggable storage, cache-aside
//! reads and HS256 JWT authentication.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Account entities and the repository contract
//! - **Application Layer** ([`application`]) - Account lifecycle, token service, cache-aside decorator
//! - **Infrastructure Layer** ([`infrastructure`]) - In-memory and PostgreSQL repositories, caches, password hashing
//! - **API Layer** ([`api`]) - REST handlers, DTOs, and auth middleware
//!
//! ## Backends
//!
//! | Concern    | Options                                |
//! |------------|----------------------------------------|
//! | Repository | `memory`, `postgres`                   |
//! | Cache      | `none`, `memory`, `redis`              |
//!
//! ## Quick Start
//!
//! ```bash
//! export JWT_SECRET="$(openssl rand -hex 32)"
//! export REPOSITORY_BACKEND=memory
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;

pub mod config;
pub mod logging;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{
        AccountManager, AccountService, CachedAccountService, JwtTokenService, TokenService,
    };
    pub use crate::domain::entities::{Account, AccountView, Role, TokenClaims};
    pub use crate::domain::repositories::AccountRepository;
    pub use crate::error::AppError;
    pub use crate::state::AppState;
}
