//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  {short_path}/{short_id}` - Short link resolution (rate limited)
//! - `/api/*`                       - JSON API (rate limited)
//! - `GET  /health`                 - Health check: DB, rate limit store, analytics queue
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Sliding window per client and route class
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::rate_limit::{self, RateLimiter};
use crate::api::middleware::tracing as trace;
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with trailing-slash normalization.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

/// All routes and middleware, without path normalization.
///
/// Rate limiting wraps the whole router and classifies requests by path, so
/// unrelated routes never reach the counter store.
pub fn router(state: AppState) -> Router {
    let config = state.config.clone();
    let limiter = RateLimiter::new(state.rate_limiter.clone(), config.short_path_prefix.clone());

    Router::new()
        .route(
            &format!("{}/{{short_id}}", config.short_path_prefix),
            get(redirect_handler),
        )
        .route("/health", get(health_handler))
        .nest("/api", api::routes::routes(config.max_body_bytes))
        .with_state(state)
        .layer(middleware::from_fn_with_state(limiter, rate_limit::layer))
        .layer(trace::layer())
}
