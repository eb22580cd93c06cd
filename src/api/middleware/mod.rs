//! HTTP middleware for request processing and protection.
//!
//! Provides admission control, request gating and observability middleware.

pub mod rate_limit;
pub mod request_guard;
pub mod tracing;
