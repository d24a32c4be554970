//! Redis-backed sliding-window rate limiter
//!
//! Attempts live in a sorted set under `rate_limit:{key}`, scored by epoch
//! milliseconds. One MULTI pipeline trims the window, counts, records the
//! new attempt and refreshes the TTL, so processes sharing the Redis see one
//! budget.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use zingcab_core::{traits::RateLimiter, AppError, AppResult};

use crate::{keys, RedisCache};

#[derive(Clone)]
pub struct RedisRateLimiter {
    cache: RedisCache,
    // Keeps members unique when two attempts share a millisecond
    seq: Arc<AtomicU64>,
}

impl RedisRateLimiter {
    pub fn new(cache: RedisCache) -> Self {
        Self {
            cache,
            seq: Arc::new(AtomicU64::new(0)),
        }
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    #[instrument(skip(self))]
    async fn check_and_record(
        &self,
        key: &str,
        max_attempts: u32,
        window: Duration,
    ) -> AppResult<()> {
        let rate_key = keys::rate_limit_key(key);
        let now_ms = Utc::now().timestamp_millis();
        let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
        let window_start = now_ms.saturating_sub(window_ms);
        let member = format!("{}-{}", now_ms, self.seq.fetch_add(1, Ordering::Relaxed));
        let ttl_secs = i64::try_from(window.as_secs()).unwrap_or(i64::MAX).max(1);

        let mut conn = self.cache.connection();
        let (count,): (u64,) = redis::pipe()
            .atomic()
            .zrembyscore(&rate_key, "-inf", window_start)
            .ignore()
            .zcard(&rate_key)
            .zadd(&rate_key, member, now_ms)
            .ignore()
            .expire(&rate_key, ttl_secs)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(RedisCache::map_redis_error)?;

        if count >= u64::from(max_attempts) {
            warn!(attempts = count + 1, max_attempts, "Rate limit exceeded");
            return Err(AppError::RateLimited(key.to_string()));
        }

        debug!(attempts = count + 1, max_attempts, "Rate limit check passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_limiter() -> RedisRateLimiter {
        let cache = RedisCache::new("redis://127.0.0.1:6379")
            .await
            .expect("Failed to connect to Redis");
        cache.flush_db().await.expect("Failed to flush DB");
        RedisRateLimiter::new(cache)
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn test_limit_shared_through_redis() {
        let limiter = setup_limiter().await;
        let window = Duration::from_secs(60);

        for _ in 0..3 {
            limiter.check_and_record("auth:rider:9999999999", 3, window).await.unwrap();
        }
        let err = limiter
            .check_and_record("auth:rider:9999999999", 3, window)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RateLimited(_)));

        // a second handle on the same Redis sees the same window
        let other = RedisRateLimiter::new(limiter.cache.clone());
        assert!(other
            .check_and_record("auth:rider:9999999999", 3, window)
            .await
            .is_err());
        assert!(other
            .check_and_record("auth:rider:9000000001", 3, window)
            .await
            .is_ok());
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn test_concurrent_attempts_never_exceed_limit() {
        let limiter = setup_limiter().await;
        let window = Duration::from_secs(60);

        let handles: Vec<_> = (0..12)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.check_and_record("burst", 5, window).await })
            })
            .collect();

        let mut allowed = 0;
        for h in handles {
            if h.await.unwrap().is_ok() {
                allowed += 1;
            }
        }
        assert_eq!(allowed, 5);
    }
}
