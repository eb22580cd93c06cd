//! Domain layer containing business entities and contracts.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`analytics`] - Analytics event model and sink trait
//! - [`analytics_worker`] - Non-blocking dispatch and background persistence
//!
//! The domain layer has no dependencies on infrastructure or presentation
//! layers. Repository and sink traits are implemented in
//! [`crate::infrastructure`].
//!
//! # Analytics Flow
//!
//! 1. A service or handler builds an [`analytics::AnalyticsEvent`]
//! 2. [`analytics_worker::AnalyticsDispatcher::emit`] queues it without awaiting
//! 3. [`analytics_worker::run_analytics_worker`] persists it with retry
//! 4. Events that keep failing are logged and dropped

pub mod analytics;
pub mod analytics_worker;
pub mod entities;
pub mod repositories;
