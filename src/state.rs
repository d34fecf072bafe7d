//! Shared application state injected into handlers and middleware.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::{
    AccountManager, AccountService, CachedAccountService, TokenService,
};
use crate::domain::repositories::AccountRepository;
use crate::infrastructure::cache::{CacheService, NullCache};

/// Backends are chosen once at construction and held as trait objects.
#[derive(Clone)]
pub struct AppState {
    /// Business operations, cache-aware when a cache is attached.
    pub accounts: Arc<dyn AccountService>,
    /// The cache-aside decorator, when caching is enabled.
    pub cached: Option<Arc<CachedAccountService<dyn AccountService>>>,
    pub repository: Arc<dyn AccountRepository>,
    pub cache: Arc<dyn CacheService>,
    pub tokens: Arc<dyn TokenService>,
}

impl AppState {
    /// Builds an uncached state over `repository`.
    pub fn new(repository: Arc<dyn AccountRepository>, tokens: Arc<dyn TokenService>) -> Self {
        let manager: Arc<dyn AccountService> = Arc::new(AccountManager::new(
            Arc::clone(&repository),
            Arc::clone(&tokens),
        ));

        Self {
            accounts: manager,
            cached: None,
            repository,
            cache: Arc::new(NullCache::new()),
            tokens,
        }
    }

    /// Wraps the account service in the cache-aside decorator.
    ///
    /// Intended to be called once, right after [`AppState::new`].
    pub fn with_cache(
        mut self,
        cache: Arc<dyn CacheService>,
        ttl: Duration,
        warm_concurrency: usize,
    ) -> Self {
        let cached = Arc::new(CachedAccountService::new(
            Arc::clone(&self.accounts),
            Arc::clone(&cache),
            Some(ttl),
            warm_concurrency,
        ));

        self.accounts = Arc::clone(&cached) as Arc<dyn AccountService>;
        self.cached = Some(cached);
        self.cache = cache;
        self
    }

    /// Purges every cached account projection, returning the number removed.
    pub async fn purge_cache(&self) -> u64 {
        match &self.cached {
            Some(cached) => cached.invalidate_all().await,
            None => 0,
        }
    }
}
