//! Sign-in attempt limiting
//!
//! `InMemoryRateLimiter` keeps a sliding window of attempt instants per key
//! behind one `parking_lot::Mutex`; counting and recording happen under the
//! same lock. `AuthThrottle` applies the configured limit to the OTP and
//! admin sign-in flows.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;
use zingcab_core::{config::RateLimitConfig, traits::RateLimiter, AppError, AppResult};

/// Idle keys are only swept once the map grows past this
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Debug, Default)]
pub struct InMemoryRateLimiter {
    hits: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl InMemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts currently inside `window` for a key
    pub fn attempts(&self, key: &str, window: Duration) -> usize {
        let now = Instant::now();
        self.hits
            .lock()
            .get(key)
            .map_or(0, |q| q.iter().filter(|t| now.duration_since(**t) < window).count())
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check_and_record(
        &self,
        key: &str,
        max_attempts: u32,
        window: Duration,
    ) -> AppResult<()> {
        let now = Instant::now();
        let mut hits = self.hits.lock();

        if hits.len() > SWEEP_THRESHOLD {
            hits.retain(|_, q| q.back().is_some_and(|t| now.duration_since(*t) < window));
        }

        let queue = hits.entry(key.to_string()).or_default();
        while queue
            .front()
            .is_some_and(|t| now.duration_since(*t) >= window)
        {
            queue.pop_front();
        }

        let count = queue.len();
        queue.push_back(now);

        if count >= max_attempts as usize {
            warn!(key = %key, attempts = count + 1, max_attempts, "Rate limit exceeded");
            return Err(AppError::RateLimited(key.to_string()));
        }
        Ok(())
    }
}

/// Which sign-in flow an attempt belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScope {
    Rider,
    Driver,
    Admin,
}

impl AuthScope {
    fn as_str(&self) -> &'static str {
        match self {
            AuthScope::Rider => "rider",
            AuthScope::Driver => "driver",
            AuthScope::Admin => "admin",
        }
    }
}

/// Per-subject limit shared by every sign-in step of one flow
///
/// Requesting, verifying and registering with the same phone number all
/// draw from the same budget.
#[derive(Clone)]
pub struct AuthThrottle {
    limiter: Arc<dyn RateLimiter>,
    max_attempts: u32,
    window: Duration,
}

impl AuthThrottle {
    pub fn new(limiter: Arc<dyn RateLimiter>, max_attempts: u32, window: Duration) -> Self {
        Self {
            limiter,
            max_attempts,
            window,
        }
    }

    pub fn from_config(limiter: Arc<dyn RateLimiter>, config: &RateLimitConfig) -> Self {
        Self::new(
            limiter,
            config.auth_max_attempts,
            Duration::from_secs(config.auth_window_secs),
        )
    }

    /// Count one attempt for `subject` (a phone number or an admin email)
    pub async fn attempt(&self, scope: AuthScope, subject: &str) -> AppResult<()> {
        let key = format!("auth:{}:{}", scope.as_str(), subject.trim().to_lowercase());
        self.limiter
            .check_and_record(&key, self.max_attempts, self.window)
            .await
    }
}
