//! Cache service trait and error types.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::domain::entities::AccountView;

/// Namespace prefix for cached account projections.
pub const ACCOUNT_KEY_PREFIX: &str = "user:";

/// Pattern matching every cached account projection.
pub const ACCOUNT_KEY_PATTERN: &str = "user:*";

/// Upper bound on any entry's time-to-live.
pub const MAX_CACHE_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Builds the cache key for an account id.
pub fn account_key(id: &str) -> String {
    format!("{}{}", ACCOUNT_KEY_PREFIX, id)
}

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),
    #[error("Cache operation error: {0}")]
    Operation(String),
    #[error("Cache operation '{0}' timed out")]
    Timeout(&'static str),
    #[error("Cache payload error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() {
            CacheError::Connection(e.to_string())
        } else {
            CacheError::Operation(e.to_string())
        }
    }
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Key/value cache holding account projections.
///
/// Implementations report failures as [`CacheError`]; the cache-aside
/// decorator decides whether to absorb them. Values never include the
/// password hash since only [`AccountView`] can be stored.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process TTL map
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the cached projection for an account id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(view))` on cache hit
    /// - `Ok(None)` on cache miss or expired entry
    async fn get_account(&self, id: &str) -> CacheResult<Option<AccountView>>;

    /// Stores a projection under `user:<id>`.
    ///
    /// `ttl` of `None` applies the implementation's default TTL.
    async fn set_account(
        &self,
        id: &str,
        view: &AccountView,
        ttl: Option<Duration>,
    ) -> CacheResult<()>;

    /// Removes the cached projection for an account id. Removing an absent
    /// key is not an error.
    async fn invalidate(&self, id: &str) -> CacheResult<()>;

    /// Removes every key matching a glob-style pattern (e.g. `user:*`).
    ///
    /// Returns the number of keys removed.
    async fn invalidate_pattern(&self, pattern: &str) -> CacheResult<u64>;

    /// Checks if the cache backend is reachable.
    async fn health_check(&self) -> bool;

    /// Short backend name used in logs and health output.
    fn backend(&self) -> &'static str;
}
