//! No-op cache implementation for disabled caching.

use super::service::{CacheResult, CacheService};
use crate::domain::entities::AccountView;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// A cache implementation that stores nothing.
///
/// Every lookup is a miss, so the cache-aside decorator always reaches the
/// inner service. Selected with `CACHE_BACKEND=none`.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        debug!(component = "cache", "Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get_account(&self, _id: &str) -> CacheResult<Option<AccountView>> {
        Ok(None)
    }

    async fn set_account(
        &self,
        _id: &str,
        _view: &AccountView,
        _ttl: Option<Duration>,
    ) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _id: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate_pattern(&self, _pattern: &str) -> CacheResult<u64> {
        Ok(0)
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "none"
    }
}
