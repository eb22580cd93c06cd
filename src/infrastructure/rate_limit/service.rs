//! Rate limit store trait and shared types.

use async_trait::async_trait;

/// Errors that can occur while talking to the counter store.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Rate limit store connection error: {0}")]
    ConnectionError(String),

    #[error("Rate limit store operation error: {0}")]
    OperationError(String),
}

/// Result type for rate limit store operations.
pub type RateLimitResult<T> = Result<T, RateLimitError>;

/// Route classes subject to admission control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteClass {
    /// Link creation endpoints under `/api`.
    Creation,
    /// Short link resolution under the configured short path.
    Resolution,
}

impl RouteClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creation => "creation",
            Self::Resolution => "resolution",
        }
    }

    /// Store key for a client in this route class.
    pub fn key_for(&self, client_ip: &str) -> String {
        format!("{}:{}", self.as_str(), client_ip)
    }
}

/// Outcome of one admission attempt.
///
/// `reset` is the Unix time in milliseconds at which the oldest counted
/// request leaves the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset: u64,
}

/// Sliding-window request counter keyed by client.
///
/// # Implementations
///
/// - [`crate::infrastructure::rate_limit::RedisRateLimitStore`] - Shared Redis window
/// - [`crate::infrastructure::rate_limit::NullRateLimitStore`] - Always admits
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Records one request for `key` and reports whether it is admitted.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError`] when the backing store cannot be reached.
    async fn consume(&self, key: &str) -> RateLimitResult<RateLimitDecision>;

    /// Checks if the store backend is healthy.
    async fn health_check(&self) -> bool;

    /// Whether a real backing store is configured.
    fn is_configured(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_class_keys() {
        assert_eq!(RouteClass::Creation.key_for("203.0.113.1"), "creation:203.0.113.1");
        assert_eq!(RouteClass::Resolution.key_for("::1"), "resolution:::1");
    }

    #[test]
    fn test_error_messages() {
        let err: Box<dyn std::error::Error> =
            Box::new(RateLimitError::ConnectionError("refused".to_string()));
        assert_eq!(err.to_string(), "Rate limit store connection error: refused");
        assert_eq!(
            RateLimitError::OperationError("NOSCRIPT".to_string()).to_string(),
            "Rate limit store operation error: NOSCRIPT"
        );
    }
}
