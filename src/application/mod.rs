//! Application layer services implementing business logic.
//!
//! Services orchestrate validation, repository calls and analytics emission,
//! and provide a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::shorten_service::ShortenService`] - Short link creation
//! - [`services::redirect_service::RedirectService`] - Resolution and click counting

pub mod services;
