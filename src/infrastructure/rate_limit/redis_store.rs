//! Redis-backed sliding-window rate limit store.

use super::service::{RateLimitDecision, RateLimitError, RateLimitResult, RateLimitStore};
use async_trait::async_trait;
use chrono::Utc;
use redis::{AsyncCommands, Client, Script, aio::ConnectionManager};
use tracing::{debug, info};

/// Trims the window, counts, conditionally records and reports atomically.
///
/// Returns `{allowed, remaining, reset_ms}`.
const SLIDING_WINDOW_SCRIPT: &str = r#"
local key = KEYS[1]
local now = tonumber(ARGV[1])
local window = tonumber(ARGV[2])
local limit = tonumber(ARGV[3])
local member = ARGV[4]

redis.call('ZREMRANGEBYSCORE', key, '-inf', now - window)

local count = redis.call('ZCARD', key)
local allowed = 0
if count < limit then
    redis.call('ZADD', key, now, member)
    count = count + 1
    allowed = 1
end

redis.call('PEXPIRE', key, window)

local reset = now + window
local oldest = redis.call('ZRANGE', key, 0, 0, 'WITHSCORES')
if oldest[2] then
    reset = tonumber(oldest[2]) + window
end

return {allowed, limit - count, reset}
"#;

/// Sliding-window counter shared across all service instances.
///
/// Each admitted request is a sorted-set member scored by its arrival time in
/// milliseconds. Uses `ConnectionManager` for connection reuse.
pub struct RedisRateLimitStore {
    client: ConnectionManager,
    script: Script,
    limit: u32,
    window_ms: u64,
    key_prefix: String,
}

impl RedisRateLimitStore {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError::ConnectionError`] if the URL is invalid, the
    /// connection cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str, limit: u32, window_ms: u64) -> RateLimitResult<Self> {
        info!("Connecting to Redis rate limit store");

        let client = Client::open(redis_url).map_err(|e| {
            RateLimitError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            RateLimitError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| RateLimitError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            script: Script::new(SLIDING_WINDOW_SCRIPT),
            limit,
            window_ms,
            key_prefix: "ratelimit:".to_string(),
        })
    }

    fn build_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn consume(&self, key: &str) -> RateLimitResult<RateLimitDecision> {
        let redis_key = self.build_key(key);
        let mut conn = self.client.clone();
        let now = Utc::now().timestamp_millis();
        let member = format!("{}-{}", now, rand::random::<u64>());

        let (allowed, remaining, reset): (i64, i64, i64) = self
            .script
            .key(&redis_key)
            .arg(now)
            .arg(self.window_ms)
            .arg(self.limit)
            .arg(member)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| RateLimitError::OperationError(e.to_string()))?;

        debug!(key = %redis_key, allowed, remaining, "Rate limit check");

        Ok(RateLimitDecision {
            allowed: allowed == 1,
            limit: self.limit,
            remaining: u32::try_from(remaining.max(0)).unwrap_or(0),
            reset: u64::try_from(reset.max(0)).unwrap_or(0),
        })
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
