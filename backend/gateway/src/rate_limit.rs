//! Login attempt rate limiting.
//!
//! Fixed window per key (the lowercased email). `/api/login` and chat
//! logins both count against the creator email, so password guessing
//! against the creator account is bounded.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct RateLimiter {
    // key -> (attempt_count, window_start)
    limits: Arc<RwLock<HashMap<String, (u32, Instant)>>>,
    pub max_attempts: u32,
    pub window: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(5, 300)
    }
}

impl RateLimiter {
    pub fn new(max_attempts: u32, window_secs: u64) -> Self {
        Self {
            limits: Arc::new(RwLock::new(HashMap::new())),
            max_attempts,
            window: Duration::from_secs(window_secs),
        }
    }

    /// Count an attempt for `key` and report whether it is allowed.
    pub async fn check_limit(&self, key: &str) -> bool {
        let key = key.trim().to_lowercase();
        let mut limits = self.limits.write().await;
        let now = Instant::now();

        let state = limits.entry(key.clone()).or_insert((0, now));

        if now.duration_since(state.1) > self.window {
            state.0 = 1;
            state.1 = now;
            debug!(key = %key, "Login window reset");
            return true;
        }

        state.0 += 1;
        if state.0 > self.max_attempts {
            warn!(key = %key, attempts = state.0, "Login attempts exceeded");
            false
        } else {
            true
        }
    }

    /// Forget the key, e.g. after a successful login.
    pub async fn reset(&self, key: &str) {
        self.limits.write().await.remove(&key.trim().to_lowercase());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blocks_after_max_attempts() {
        let limiter = RateLimiter::new(2, 60);
        assert!(limiter.check_limit("Owner@Example.com").await);
        assert!(limiter.check_limit("owner@example.com").await);
        assert!(!limiter.check_limit("owner@example.com").await);
        assert!(limiter.check_limit("other@example.com").await);
    }

    #[tokio::test]
    async fn reset_clears_the_count() {
        let limiter = RateLimiter::new(1, 60);
        assert!(limiter.check_limit("a@b.c").await);
        assert!(!limiter.check_limit("a@b.c").await);
        limiter.reset("A@B.C").await;
        assert!(limiter.check_limit("a@b.c").await);
    }
}
