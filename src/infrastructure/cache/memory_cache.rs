//! In-process cache backed by `moka`, with per-entry expiry.

use super::service::{CacheError, CacheResult, CacheService, MAX_CACHE_TTL, account_key};
use crate::domain::entities::AccountView;
use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use std::time::{Duration, Instant};
use tracing::debug;

const MAX_ENTRIES: u64 = 100_000;

#[derive(Clone)]
struct CachedView {
    view: AccountView,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with.
struct EntryTtl;

impl Expiry<String, CachedView> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedView,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedView,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Cache held in process memory. Suitable for a single instance.
pub struct MemoryCache {
    entries: Cache<String, CachedView>,
    default_ttl: Duration,
}

impl MemoryCache {
    pub fn new(default_ttl: Duration) -> Self {
        debug!(component = "cache", "Using in-memory cache");
        Self {
            entries: Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .expire_after(EntryTtl)
                .build(),
            default_ttl,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_account(&self, id: &str) -> CacheResult<Option<AccountView>> {
        Ok(self
            .entries
            .get(&account_key(id))
            .await
            .map(|cached| cached.view))
    }

    async fn set_account(
        &self,
        id: &str,
        view: &AccountView,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let cached = CachedView {
            view: view.clone(),
            ttl: ttl.unwrap_or(self.default_ttl).min(MAX_CACHE_TTL),
        };
        self.entries.insert(account_key(id), cached).await;
        Ok(())
    }

    async fn invalidate(&self, id: &str) -> CacheResult<()> {
        self.entries.invalidate(&account_key(id)).await;
        Ok(())
    }

    /// Removes every key matching a Redis-style glob (`*`, `?`, `[...]`).
    async fn invalidate_pattern(&self, pattern: &str) -> CacheResult<u64> {
        let matcher = glob::Pattern::new(pattern)
            .map_err(|e| CacheError::Operation(format!("invalid pattern '{}': {}", pattern, e)))?;

        let keys: Vec<_> = self
            .entries
            .iter()
            .filter(|(key, _)| matcher.matches(key))
            .map(|(key, _)| key)
            .collect();

        let mut removed = 0;
        for key in keys {
            if self.entries.remove(key.as_str()).await.is_some() {
                removed += 1;
            }
        }

        Ok(removed)
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
