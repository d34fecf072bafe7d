//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`AccountRepository`] - User account storage

pub mod account_repository;

pub use account_repository::AccountRepository;

#[cfg(test)]
pub use account_repository::MockAccountRepository;
