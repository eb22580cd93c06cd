//! No-op rate limit store used when no counter store is configured.

use super::service::{RateLimitDecision, RateLimitResult, RateLimitStore};
use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

/// A store that admits every request.
///
/// Reports the configured limit as fully available so the rate limit
/// headers stay meaningful.
pub struct NullRateLimitStore {
    limit: u32,
    window_ms: u64,
}

impl NullRateLimitStore {
    /// Creates a new NullRateLimitStore instance.
    pub fn new(limit: u32, window_ms: u64) -> Self {
        debug!("Using NullRateLimitStore (rate limiting disabled)");
        Self { limit, window_ms }
    }
}

#[async_trait]
impl RateLimitStore for NullRateLimitStore {
    async fn consume(&self, _key: &str) -> RateLimitResult<RateLimitDecision> {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();

        Ok(RateLimitDecision {
            allowed: true,
            limit: self.limit,
            remaining: self.limit,
            reset: now + self.window_ms,
        })
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn is_configured(&self) -> bool {
        false
    }
}
