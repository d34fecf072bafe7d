//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod admin;
pub mod auth;
pub mod health;
pub mod profile;

pub use admin::{
    delete_account_handler, get_account_handler, list_accounts_handler, purge_cache_handler,
};
pub use auth::{login_handler, refresh_handler, register_handler};
pub use health::health_handler;
pub use profile::{get_profile_handler, update_profile_handler};
