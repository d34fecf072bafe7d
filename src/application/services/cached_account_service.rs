//! Cache-aside decorator over an [`AccountService`].
//!
//! Reads go to the cache first and populate it on miss. Writes always reach
//! the inner service first; the cache is only touched after they succeed.
//! Cache failures are logged and counted, never returned.
//!
//! Concurrent writers to the same account can interleave their
//! invalidate/repopulate steps, so a slightly older projection may survive
//! in the cache until the TTL expires or the next write.

use async_trait::async_trait;
use metrics::counter;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::account_service::{
    AccountPage, AccountService, AuthSession, Credentials, ProfileUpdate, Registration,
};
use crate::domain::entities::AccountView;
use crate::error::AppError;
use crate::infrastructure::cache::{ACCOUNT_KEY_PATTERN, CacheError, CacheService};

const HITS: &str = "account_cache_hits_total";
const MISSES: &str = "account_cache_misses_total";
const ERRORS: &str = "account_cache_errors_total";

/// Wraps an [`AccountService`] with read-through caching of account
/// projections under `user:<id>`.
pub struct CachedAccountService<S: AccountService + ?Sized> {
    inner: Arc<S>,
    cache: Arc<dyn CacheService>,
    ttl: Option<Duration>,
    warm_permits: Arc<Semaphore>,
}

impl<S: AccountService + ?Sized> CachedAccountService<S> {
    /// `warm_concurrency` bounds how many list-warming tasks may run at once;
    /// a list call that finds no free permit skips warming.
    pub fn new(
        inner: Arc<S>,
        cache: Arc<dyn CacheService>,
        ttl: Option<Duration>,
        warm_concurrency: usize,
    ) -> Self {
        Self {
            inner,
            cache,
            ttl,
            warm_permits: Arc::new(Semaphore::new(warm_concurrency.max(1))),
        }
    }

    /// Removes every cached account projection. Best-effort: a cache failure
    /// is logged and reported as zero keys removed.
    pub async fn invalidate_all(&self) -> u64 {
        match self.cache.invalidate_pattern(ACCOUNT_KEY_PATTERN).await {
            Ok(removed) => {
                info!(component = "cached_service", removed, "account cache purged");
                removed
            }
            Err(e) => {
                cache_error("invalidate_pattern", &e);
                0
            }
        }
    }

    async fn lookup(&self, id: &str) -> Option<AccountView> {
        match self.cache.get_account(id).await {
            Ok(Some(view)) => {
                counter!(HITS).increment(1);
                Some(view)
            }
            Ok(None) => {
                counter!(MISSES).increment(1);
                None
            }
            Err(e) => {
                cache_error("get", &e);
                None
            }
        }
    }

    async fn populate(&self, view: &AccountView) {
        if let Err(e) = self.cache.set_account(&view.id, view, self.ttl).await {
            cache_error("set", &e);
        }
    }

    async fn evict(&self, id: &str) {
        if let Err(e) = self.cache.invalidate(id).await {
            cache_error("invalidate", &e);
        }
    }

    async fn read_through<F, Fut>(&self, id: &str, load: F) -> Result<AccountView, AppError>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<AccountView, AppError>> + Send,
    {
        if let Some(view) = self.lookup(id).await {
            return Ok(view);
        }

        let view = load().await?;
        self.populate(&view).await;
        Ok(view)
    }

    /// Writes list results into the cache on a detached task.
    fn warm(&self, views: &[AccountView]) {
        if views.is_empty() {
            return;
        }

        let Ok(permit) = Arc::clone(&self.warm_permits).try_acquire_owned() else {
            debug!(component = "cached_service", "list warming skipped, no permit available");
            return;
        };

        let cache = Arc::clone(&self.cache);
        let ttl = self.ttl;
        let views = views.to_vec();

        tokio::spawn(async move {
            let _permit = permit;
            for view in &views {
                if let Err(e) = cache.set_account(&view.id, view, ttl).await {
                    cache_error("warm", &e);
                }
            }
            debug!(component = "cached_service", warmed = views.len(), "list entries warmed");
        });
    }
}

fn cache_error(operation: &'static str, error: &CacheError) {
    counter!(ERRORS, "operation" => operation).increment(1);
    warn!(component = "cached_service", operation, error = %error, "cache operation failed");
}

#[async_trait]
impl<S: AccountService + ?Sized> AccountService for CachedAccountService<S> {
    async fn register(&self, registration: Registration) -> Result<AccountView, AppError> {
        let view = self.inner.register(registration).await?;
        self.populate(&view).await;
        Ok(view)
    }

    async fn authenticate(&self, credentials: Credentials) -> Result<AuthSession, AppError> {
        let session = self.inner.authenticate(credentials).await?;
        self.populate(&session.account).await;
        Ok(session)
    }

    async fn get_profile(&self, id: &str) -> Result<AccountView, AppError> {
        self.read_through(id, || self.inner.get_profile(id)).await
    }

    async fn update_profile(
        &self,
        id: &str,
        update: ProfileUpdate,
    ) -> Result<AccountView, AppError> {
        let view = self.inner.update_profile(id, update).await?;
        self.evict(id).await;
        self.populate(&view).await;
        Ok(view)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<AccountPage, AppError> {
        let page = self.inner.list(limit, offset).await?;
        self.warm(&page.accounts);
        Ok(page)
    }

    async fn get_by_id(&self, id: &str) -> Result<AccountView, AppError> {
        self.read_through(id, || self.inner.get_by_id(id)).await
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.inner.delete(id).await?;
        self.evict(id).await;
        Ok(())
    }

    async fn refresh_token(&self, id: &str) -> Result<AuthSession, AppError> {
        self.inner.refresh_token(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::account_service::MockAccountService;
    use crate::domain::entities::Role;
    use crate::infrastructure::cache::{CacheResult, MemoryCache};
    use chrono::Utc;
    use serde_json::json;

    fn view(id: &str, name: &str) -> AccountView {
        let now = Utc::now();
        AccountView {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{}@x.com", id),
            role: Role::Standard,
            created_at: now,
            updated_at: now,
        }
    }

    fn decorate(
        inner: MockAccountService,
        cache: Arc<dyn CacheService>,
    ) -> CachedAccountService<MockAccountService> {
        CachedAccountService::new(Arc::new(inner), cache, Some(Duration::from_secs(60)), 2)
    }

    /// Cache whose every operation fails.
    struct BrokenCache;

    #[async_trait]
    impl CacheService for BrokenCache {
        async fn get_account(&self, _id: &str) -> CacheResult<Option<AccountView>> {
            Err(CacheError::Connection("down".to_string()))
        }
        async fn set_account(
            &self,
            _id: &str,
            _view: &AccountView,
            _ttl: Option<Duration>,
        ) -> CacheResult<()> {
            Err(CacheError::Timeout("set"))
        }
        async fn invalidate(&self, _id: &str) -> CacheResult<()> {
            Err(CacheError::Connection("down".to_string()))
        }
        async fn invalidate_pattern(&self, _pattern: &str) -> CacheResult<u64> {
            Err(CacheError::Connection("down".to_string()))
        }
        async fn health_check(&self) -> bool {
            false
        }
        fn backend(&self) -> &'static str {
            "broken"
        }
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let mut inner = MockAccountService::new();
        inner
            .expect_get_by_id()
            .times(1)
            .returning(|id| Ok(view(id, "Alice")));

        let service = decorate(inner, Arc::new(MemoryCache::new(Duration::from_secs(60))));

        let first = service.get_by_id("1").await.unwrap();
        let second = service.get_by_id("1").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_failed_read_is_not_cached() {
        let mut inner = MockAccountService::new();
        inner
            .expect_get_profile()
            .times(2)
            .returning(|id| Err(AppError::not_found("User not found", json!({ "id": id }))));

        let service = decorate(inner, Arc::new(MemoryCache::new(Duration::from_secs(60))));

        assert!(service.get_profile("9").await.is_err());
        assert!(service.get_profile("9").await.is_err());
    }

    #[tokio::test]
    async fn test_update_replaces_cached_projection() {
        let cache = Arc::new(MemoryCache::new(Duration::from_secs(60)));
        cache.set_account("1", &view("1", "Alice"), None).await.unwrap();

        let mut inner = MockAccountService::new();
        inner
            .expect_update_profile()
            .times(1)
            .returning(|id, _| Ok(view(id, "Alicia")));
        inner.expect_get_profile().never();

        let service = decorate(inner, cache);
        service
            .update_profile(
                "1",
                ProfileUpdate {
                    name: Some("Alicia".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(service.get_profile("1").await.unwrap().name, "Alicia");
    }

    #[tokio::test]
    async fn test_failed_write_leaves_cache_untouched() {
        let cache = Arc::new(MemoryCache::new(Duration::from_secs(60)));
        cache.set_account("1", &view("1", "Alice"), None).await.unwrap();

        let mut inner = MockAccountService::new();
        inner.expect_delete().times(1).returning(|_| {
            Err(AppError::transport("Database connection error", json!({})))
        });

        let service = decorate(inner, Arc::clone(&cache) as Arc<dyn CacheService>);
        assert!(service.delete("1").await.is_err());
        assert!(cache.get_account("1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_evicts() {
        let cache = Arc::new(MemoryCache::new(Duration::from_secs(60)));
        cache.set_account("1", &view("1", "Alice"), None).await.unwrap();

        let mut inner = MockAccountService::new();
        inner.expect_delete().times(1).returning(|_| Ok(()));

        let service = decorate(inner, Arc::clone(&cache) as Arc<dyn CacheService>);
        service.delete("1").await.unwrap();
        assert!(cache.get_account("1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cache_failures_are_absorbed() {
        let mut inner = MockAccountService::new();
        inner
            .expect_get_by_id()
            .times(2)
            .returning(|id| Ok(view(id, "Alice")));
        inner.expect_delete().times(1).returning(|_| Ok(()));

        let service = decorate(inner, Arc::new(BrokenCache));

        assert!(service.get_by_id("1").await.is_ok());
        assert!(service.get_by_id("1").await.is_ok());
        assert!(service.delete("1").await.is_ok());
        assert_eq!(service.invalidate_all().await, 0);
    }

    #[tokio::test]
    async fn test_refresh_bypasses_cache() {
        let cache = Arc::new(MemoryCache::new(Duration::from_secs(60)));

        let mut inner = MockAccountService::new();
        inner.expect_refresh_token().times(1).returning(|id| {
            Ok(AuthSession {
                token: "t".to_string(),
                expires_in: 60,
                account: view(id, "Alice"),
            })
        });

        let service = decorate(inner, Arc::clone(&cache) as Arc<dyn CacheService>);
        service.refresh_token("1").await.unwrap();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_all_purges_account_keys() {
        let cache = Arc::new(MemoryCache::new(Duration::from_secs(60)));
        for id in ["1", "2"] {
            cache.set_account(id, &view(id, "x"), None).await.unwrap();
        }

        let service = decorate(
            MockAccountService::new(),
            Arc::clone(&cache) as Arc<dyn CacheService>,
        );
        assert_eq!(service.invalidate_all().await, 2);
        assert!(cache.is_empty());
    }
}
