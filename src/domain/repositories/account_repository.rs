//! Repository trait for account storage.

use crate::domain::entities::{Account, AccountPatch, NewAccount};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for user accounts.
///
/// The repository is the source of truth and the only place the email
/// uniqueness invariant is enforced. All returned [`Account`] values are
/// owned copies; mutating them never affects stored state.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryAccountRepository`] - in-process storage
/// - [`crate::infrastructure::persistence::PgAccountRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_memory.rs`, `tests/repository_pg.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Stores a new account, assigning its id and timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AlreadyExists`] if the email is already taken.
    async fn create(&self, new_account: NewAccount) -> Result<Account, AppError>;

    /// Finds an account by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no account has this id.
    async fn get_by_id(&self, id: &str) -> Result<Account, AppError>;

    /// Finds an account by its normalized email.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no account has this email.
    async fn get_by_email(&self, email: &str) -> Result<Account, AppError>;

    /// Applies a partial update and returns the stored result.
    ///
    /// `created_at` is preserved and `updated_at` refreshed, even for an
    /// empty patch.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the id is absent, or
    /// [`AppError::AlreadyExists`] if the new email belongs to another account.
    async fn update(&self, id: &str, patch: AccountPatch) -> Result<Account, AppError>;

    /// Removes an account together with its email index entry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the id is absent.
    async fn delete(&self, id: &str) -> Result<(), AppError>;

    /// Lists accounts newest first (ties broken by id), then applies
    /// `offset` and `limit`. An offset past the end yields an empty page.
    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<Account>, AppError>;

    /// Total number of stored accounts.
    async fn count(&self) -> Result<u64, AppError>;
}
