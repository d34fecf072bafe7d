//! Data Transfer Objects for API requests and responses.
//!
//! Request DTOs convert into service inputs; validation happens in the
//! account service, not here.

pub mod account;
pub mod auth;
pub mod health;
pub mod pagination;
