//! Repository trait for short link data access.

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for short links.
///
/// Counter updates must be single atomic increments that return the updated
/// record, never a read followed by a write.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new short link with zeroed counters.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short id already exists.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Finds a link by its short id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_short_id(&self, short_id: &str) -> Result<Option<ShortLink>, AppError>;

    /// Atomically increments `accesses` and returns the updated record.
    ///
    /// Returns `Ok(None)` if no link has this short id.
    async fn increment_accesses(&self, short_id: &str) -> Result<Option<ShortLink>, AppError>;

    /// Atomically increments `clicks` and returns the updated record.
    ///
    /// Returns `Ok(None)` if no link has this short id.
    async fn increment_clicks(&self, short_id: &str) -> Result<Option<ShortLink>, AppError>;

    /// Checks store connectivity.
    async fn health_check(&self) -> Result<(), AppError>;
}
