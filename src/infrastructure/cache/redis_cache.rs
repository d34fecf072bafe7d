//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService, MAX_CACHE_TTL, account_key};
use crate::domain::entities::AccountView;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, RedisResult, aio::ConnectionManager};
use std::future::Future;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

const SCAN_BATCH: usize = 100;
const CONNECT_ATTEMPTS: usize = 3;

/// Timeouts applied to the Redis connection.
#[derive(Debug, Clone, Copy)]
pub struct RedisTimeouts {
    pub dial: Duration,
    pub read: Duration,
    pub write: Duration,
}

/// Redis cache for account projections.
///
/// Uses a `ConnectionManager` for connection reuse and automatic reconnects.
/// Every command is bounded by the read or write timeout and failures are
/// returned to the caller as [`CacheError`].
pub struct RedisCache {
    client: ConnectionManager,
    default_ttl: Duration,
    timeouts: RedisTimeouts,
}

impl RedisCache {
    /// Connects to Redis, validates the connection with a PING, and configures the default TTL.
    ///
    /// Connection attempts are retried with exponential backoff; each attempt
    /// is bounded by the dial timeout.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Connection`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(
        redis_url: &str,
        default_ttl: Duration,
        timeouts: RedisTimeouts,
    ) -> CacheResult<Self> {
        info!(component = "cache", "Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::Connection(format!("Failed to create Redis client: {}", e))
        })?;

        let strategy = ExponentialBackoff::from_millis(50)
            .max_delay(Duration::from_secs(1))
            .map(jitter)
            .take(CONNECT_ATTEMPTS - 1);

        let manager = Retry::spawn(strategy, || {
            let client = client.clone();
            async move {
                match tokio::time::timeout(timeouts.dial, ConnectionManager::new(client)).await {
                    Ok(Ok(manager)) => Ok(manager),
                    Ok(Err(e)) => {
                        warn!(component = "cache", error = %e, "Redis connect attempt failed");
                        Err(CacheError::Connection(format!(
                            "Failed to connect to Redis: {}",
                            e
                        )))
                    }
                    Err(_) => {
                        warn!(component = "cache", "Redis connect attempt timed out");
                        Err(CacheError::Timeout("connect"))
                    }
                }
            }
        })
        .await?;

        let cache = Self {
            client: manager,
            default_ttl,
            timeouts,
        };

        let mut conn = cache.client.clone();
        cache
            .bounded(cache.timeouts.read, "ping", conn.ping::<()>())
            .await
            .map_err(|e| CacheError::Connection(format!("Redis PING failed: {}", e)))?;

        info!(component = "cache", "✓ Connected to Redis");

        Ok(cache)
    }

    async fn bounded<T, F>(&self, limit: Duration, operation: &'static str, fut: F) -> CacheResult<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result.map_err(CacheError::from),
            Err(_) => Err(CacheError::Timeout(operation)),
        }
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_account(&self, id: &str) -> CacheResult<Option<AccountView>> {
        let key = account_key(id);
        let mut conn = self.client.clone();

        let raw = self
            .bounded(self.timeouts.read, "get", conn.get::<_, Option<String>>(&key))
            .await?;

        match raw {
            Some(json) => {
                debug!(component = "cache", key = %key, "Cache HIT");
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => {
                debug!(component = "cache", key = %key, "Cache MISS");
                Ok(None)
            }
        }
    }

    async fn set_account(
        &self,
        id: &str,
        view: &AccountView,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let key = account_key(id);
        let payload = serde_json::to_string(view)?;
        let ttl_seconds = ttl
            .unwrap_or(self.default_ttl)
            .min(MAX_CACHE_TTL)
            .as_secs()
            .max(1);
        let mut conn = self.client.clone();

        self.bounded(
            self.timeouts.write,
            "set",
            conn.set_ex::<_, _, ()>(&key, payload, ttl_seconds),
        )
        .await?;

        debug!(component = "cache", key = %key, ttl_seconds, "Cache SET");
        Ok(())
    }

    async fn invalidate(&self, id: &str) -> CacheResult<()> {
        let key = account_key(id);
        let mut conn = self.client.clone();

        let deleted = self
            .bounded(self.timeouts.write, "del", conn.del::<_, i64>(&key))
            .await?;
        if deleted > 0 {
            debug!(component = "cache", key = %key, "Cache INVALIDATE");
        }
        Ok(())
    }

    async fn invalidate_pattern(&self, pattern: &str) -> CacheResult<u64> {
        let mut conn = self.client.clone();
        let mut cursor: u64 = 0;
        let mut removed: u64 = 0;

        loop {
            let mut scan = redis::cmd("SCAN");
            scan.arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH);
            let (next, keys): (u64, Vec<String>) = self
                .bounded(self.timeouts.read, "scan", scan.query_async(&mut conn))
                .await?;

            if !keys.is_empty() {
                let deleted = self
                    .bounded(self.timeouts.write, "del", conn.del::<_, i64>(&keys))
                    .await?;
                removed += deleted.max(0) as u64;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        info!(component = "cache", pattern, removed, "Cache pattern invalidated");
        Ok(removed)
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        self.bounded(self.timeouts.read, "ping", conn.ping::<()>())
            .await
            .is_ok()
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
