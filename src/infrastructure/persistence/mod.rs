//! PostgreSQL implementations of domain traits.
//!
//! - [`PgLinkRepository`] - Short link storage and atomic counter updates
//! - [`PgAnalyticsSink`] - Analytics event storage

pub mod pg_analytics_sink;
pub mod pg_link_repository;

pub use pg_analytics_sink::PgAnalyticsSink;
pub use pg_link_repository::PgLinkRepository;
