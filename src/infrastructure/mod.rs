//! Infrastructure layer for external integrations.
//!
//! Implements the contracts defined by the domain and application layers.
//!
//! # Modules
//!
//! - [`cache`] - Account projection caches (Redis, in-memory, no-op)
//! - [`persistence`] - Account repositories (in-memory, PostgreSQL)
//! - [`security`] - Password hashing

pub mod cache;
pub mod persistence;
pub mod security;
