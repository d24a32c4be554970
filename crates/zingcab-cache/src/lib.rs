//! Redis layer for ZingCab
//!
//! Provides a shared Redis connection, the Redis-backed one-time code store
//! and the sign-in rate limiter used when several API processes must share
//! state.
//!
//! # Features
//!
//! - Connection pooling via Redis ConnectionManager
//! - `RedisCredentialStore` with per-key TTLs and an atomic Lua verification
//! - `RedisRateLimiter` with sorted-set sliding windows
//! - Error conversion to AppError
//!
//! # Example
//!
//! ```no_run
//! use zingcab_cache::{RedisCache, RedisCredentialStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cache = RedisCache::new("redis://127.0.0.1:6379").await?;
//!     cache.ping().await?;
//!
//!     let store = RedisCredentialStore::new(cache);
//!     Ok(())
//! }
//! ```

pub mod credential_store;
pub mod keys;
pub mod rate_limiter;

pub use credential_store::RedisCredentialStore;
pub use rate_limiter::RedisRateLimiter;

use redis::{aio::ConnectionManager, Client, RedisError};
use tracing::{debug, error, warn};
use zingcab_core::error::AppError;

/// Redis connection wrapper
///
/// Wraps a Redis ConnectionManager to provide efficient, multiplexed access
/// to Redis. Cloning is cheap and shares the underlying connection.
#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    /// Create a new Redis connection
    ///
    /// # Errors
    ///
    /// Returns `AppError::CacheConnection` if the connection fails
    pub async fn new(url: &str) -> Result<Self, AppError> {
        debug!("Connecting to Redis");

        let client = Client::open(url).map_err(|e| {
            error!("Failed to create Redis client: {}", e);
            AppError::CacheConnection(format!("Invalid Redis URL: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            error!("Failed to establish Redis connection: {}", e);
            AppError::CacheConnection(format!("Connection failed: {}", e))
        })?;

        debug!("Redis connection established successfully");
        Ok(Self { manager })
    }

    /// Ping the Redis server to check connectivity
    pub async fn ping(&self) -> Result<(), AppError> {
        let mut conn = self.manager.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                error!("Redis ping failed: {}", e);
                AppError::Cache(format!("Ping failed: {}", e))
            })?;
        Ok(())
    }

    /// Handle to the multiplexed connection
    pub fn connection(&self) -> ConnectionManager {
        self.manager.clone()
    }

    /// Flush all keys from the current database (tests only)
    #[cfg(test)]
    pub async fn flush_db(&self) -> Result<(), AppError> {
        let mut conn = self.manager.clone();
        let _: () = redis::cmd("FLUSHDB")
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                error!("Failed to flush database: {}", e);
                AppError::Cache(format!("Flush failed: {}", e))
            })?;
        Ok(())
    }

    /// Convert RedisError to AppError
    pub(crate) fn map_redis_error(err: RedisError) -> AppError {
        match err.kind() {
            redis::ErrorKind::IoError => {
                error!("Redis I/O error: {}", err);
                AppError::CacheConnection(format!("I/O error: {}", err))
            }
            redis::ErrorKind::TypeError => {
                warn!("Redis type error: {}", err);
                AppError::Cache(format!("Type mismatch: {}", err))
            }
            _ => {
                error!("Redis error: {}", err);
                AppError::Cache(err.to_string())
            }
        }
    }
}
