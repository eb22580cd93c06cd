//! Admission-control counter stores.
//!
//! Provides a [`RateLimitStore`] trait with two implementations:
//! - [`RedisRateLimitStore`] - Redis sorted-set sliding window
//! - [`NullRateLimitStore`] - Fail-open store used when no Redis is configured

mod null_store;
mod redis_store;
mod service;

pub use null_store::NullRateLimitStore;
pub use redis_store::RedisRateLimitStore;
pub use service::{
    RateLimitDecision, RateLimitError, RateLimitResult, RateLimitStore, RouteClass,
};

#[cfg(test)]
pub use service::MockRateLimitStore;
