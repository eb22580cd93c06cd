//! Sliding-window admission control for creation and resolution routes.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::infrastructure::rate_limit::{RateLimitDecision, RateLimitStore, RouteClass};
use crate::utils::client_ip::client_ip_from_headers;

pub const HEADER_LIMIT: &str = "x-ratelimit-limit";
pub const HEADER_REMAINING: &str = "x-ratelimit-remaining";
pub const HEADER_RESET: &str = "x-ratelimit-reset";

/// Body of a `429 Too Many Requests` response.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateLimitedBody {
    pub error: String,
    pub limit: u32,
    pub remaining: u32,
    pub reset: u64,
}

/// State for the rate limit middleware.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    short_path_prefix: String,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, short_path_prefix: impl Into<String>) -> Self {
        Self {
            store,
            short_path_prefix: short_path_prefix.into(),
        }
    }

    /// Route class of `path`, or `None` when the path is not rate limited.
    pub fn classify(&self, path: &str) -> Option<RouteClass> {
        if path == "/api" || path.starts_with("/api/") {
            return Some(RouteClass::Creation);
        }

        path.strip_prefix(self.short_path_prefix.as_str())
            .filter(|rest| rest.starts_with('/'))
            .map(|_| RouteClass::Resolution)
    }
}

/// Applies admission control to classified routes.
///
/// Every response on a classified route carries `X-RateLimit-Limit`,
/// `X-RateLimit-Remaining` and `X-RateLimit-Reset`. Rejected requests get
/// `429` with the same values in the body. Other routes pass through without
/// touching the store.
///
/// # Errors
///
/// Store failures are logged and answered with a generic `500`.
pub async fn layer(State(limiter): State<RateLimiter>, req: Request, next: Next) -> Response {
    let Some(class) = limiter.classify(req.uri().path()) else {
        return next.run(req).await;
    };

    let client_ip = client_ip_from_headers(req.headers());
    let key = class.key_for(&client_ip);

    let decision = match limiter.store.consume(&key).await {
        Ok(decision) => decision,
        Err(e) => {
            return AppError::internal(format!("Rate limit store failure for {key}: {e}"))
                .into_response();
        }
    };

    if !decision.allowed {
        tracing::debug!(%key, reset = decision.reset, "Rate limit exceeded");

        let body = RateLimitedBody {
            error: "Too many requests".to_string(),
            limit: decision.limit,
            remaining: 0,
            reset: decision.reset,
        };

        let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
        apply_headers(response.headers_mut(), &decision);
        return response;
    }

    let mut response = next.run(req).await;
    apply_headers(response.headers_mut(), &decision);
    response
}

fn apply_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert(HEADER_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(HEADER_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(HEADER_RESET, HeaderValue::from(decision.reset));
}
