//! HTTP server initialization and runtime setup.
//!
//! Handles backend selection (repository, cache, token service), state
//! wiring and the Axum server lifecycle.

use crate::application::services::JwtTokenService;
use crate::config::{CacheBackend, Config, RepositoryBackend};
use crate::domain::repositories::AccountRepository;
use crate::infrastructure::cache::{CacheService, MemoryCache, RedisCache};
use crate::infrastructure::persistence::{MemoryAccountRepository, PgAccountRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Opens a PostgreSQL pool sized from the configuration.
///
/// # Errors
///
/// Returns an error if no database URL is configured or the connection fails.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is not configured")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");
    Ok(pool)
}

/// Builds the account repository selected by `REPOSITORY_BACKEND`.
pub async fn build_repository(config: &Config) -> Result<Arc<dyn AccountRepository>> {
    match config.repository_backend {
        RepositoryBackend::Memory => {
            tracing::info!("Repository: in-memory");
            Ok(Arc::new(MemoryAccountRepository::new()))
        }
        RepositoryBackend::Postgres => {
            let pool = connect_pool(config).await?;
            let repo = PgAccountRepository::new(Arc::new(pool), config.db_timeout())
                .await
                .map_err(|e| anyhow::anyhow!("Failed to prepare accounts schema: {}", e))?;
            tracing::info!("Repository: PostgreSQL");
            Ok(Arc::new(repo))
        }
    }
}

/// Builds the cache selected by `CACHE_BACKEND`.
///
/// Returns `None` when caching is disabled. A Redis connection failure is
/// logged and also disables caching rather than aborting startup.
pub async fn build_cache(config: &Config) -> Option<Arc<dyn CacheService>> {
    match config.cache_backend {
        CacheBackend::None => {
            tracing::info!("Cache disabled");
            None
        }
        CacheBackend::Memory => {
            tracing::info!("Cache enabled (in-memory)");
            Some(Arc::new(MemoryCache::new(config.cache_ttl())))
        }
        CacheBackend::Redis => {
            let url = config.redis_url.as_deref()?;
            match RedisCache::connect(url, config.cache_ttl(), config.redis_timeouts()).await {
                Ok(redis) => {
                    tracing::info!("Cache enabled (Redis)");
                    Some(Arc::new(redis))
                }
                Err(e) => {
                    tracing::warn!("Failed to connect to Redis: {}. Caching disabled.", e);
                    None
                }
            }
        }
    }
}

/// Wires repository, cache and token service into an [`AppState`].
pub async fn build_state(config: &Config) -> Result<AppState> {
    let repository = build_repository(config).await?;
    let tokens = Arc::new(JwtTokenService::new(
        config.jwt_secret.expose().as_bytes(),
        config.jwt_expiration(),
    ));

    let state = AppState::new(repository, tokens);

    Ok(match build_cache(config).await {
        Some(cache) => state.with_cache(cache, config.cache_ttl(), config.cache_warm_concurrency),
        None => state,
    })
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Account repository (in-memory or PostgreSQL)
/// - Cache (Redis, in-memory, or none)
/// - JWT token service
/// - Axum HTTP server with graceful shutdown on Ctrl+C / SIGTERM
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let state = build_state(&config).await?;

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
