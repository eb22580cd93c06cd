//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence and admission control.
//!
//! # Modules
//!
//! - [`persistence`] - PostgreSQL repository and analytics sink
//! - [`rate_limit`] - Sliding-window counter stores (Redis and no-op)

pub mod persistence;
pub mod rate_limit;
