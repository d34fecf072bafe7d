//! HTTP middleware for request processing and protection.
//!
//! Provides bearer authentication, role authorization, and observability middleware.

pub mod auth;
pub mod tracing;

pub use auth::{AuthContext, AuthOutcome};
