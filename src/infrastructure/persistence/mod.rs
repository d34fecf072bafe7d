//! Account repository implementations.
//!
//! # Repositories
//!
//! - [`MemoryAccountRepository`] - in-process maps behind a single lock
//! - [`PgAccountRepository`] - PostgreSQL storage via SQLx

pub mod memory_account_repository;
pub mod pg_account_repository;

pub use memory_account_repository::MemoryAccountRepository;
pub use pg_account_repository::PgAccountRepository;
