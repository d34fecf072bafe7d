//! Caching layer for account projections.
//!
//! Provides a [`CacheService`] trait with three implementations:
//! - [`RedisCache`] - Production Redis-backed cache
//! - [`MemoryCache`] - In-process TTL map for single-instance deployments and tests
//! - [`NullCache`] - No-op implementation for disabled caching

mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use memory_cache::MemoryCache;
pub use null_cache::NullCache;
pub use redis_cache::{RedisCache, RedisTimeouts};
pub use service::{
    ACCOUNT_KEY_PATTERN, ACCOUNT_KEY_PREFIX, CacheError, CacheResult, CacheService,
    MAX_CACHE_TTL, account_key,
};
