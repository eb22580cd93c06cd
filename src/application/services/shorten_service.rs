//! Short link creation service.

use std::sync::Arc;

use crate::config::Config;
use crate::domain::analytics::AnalyticsEvent;
use crate::domain::analytics_worker::AnalyticsDispatcher;
use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::short_id::generate_short_id_with_length;
use crate::utils::slug_validator::validate_custom_slug;
use crate::utils::url_validator::UrlValidator;

/// Message returned when a requested custom slug already exists.
pub const CUSTOM_SLUG_TAKEN_MESSAGE: &str = "This custom URL is already taken";

/// Attempts made to allocate a free generated short id.
pub const MAX_GENERATION_ATTEMPTS: usize = 10;

/// Result of a successful shortening request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortenOutcome {
    pub short_id: String,
    pub original_url: String,
    pub short_url: String,
}

/// Service for creating short links.
///
/// Screens the destination URL, allocates a short id (custom or generated),
/// persists the link and emits a `link_created` analytics event.
pub struct ShortenService {
    link_repository: Arc<dyn LinkRepository>,
    analytics: AnalyticsDispatcher,
    url_validator: UrlValidator,
    config: Arc<Config>,
}

impl ShortenService {
    /// Creates a new shortening service.
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        analytics: AnalyticsDispatcher,
        config: Arc<Config>,
    ) -> Self {
        Self {
            link_repository,
            analytics,
            url_validator: UrlValidator::from_config(&config),
            config,
        }
    }

    /// Shortens `url`, optionally under a caller-chosen slug.
    ///
    /// A `custom_slug` that is empty after trimming is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL or the custom slug is rejected.
    /// Returns [`AppError::Conflict`] if the custom slug is already taken.
    /// Returns [`AppError::Internal`] on storage errors or when no free
    /// generated id is found after [`MAX_GENERATION_ATTEMPTS`] tries.
    pub async fn shorten(
        &self,
        url: &str,
        custom_slug: Option<&str>,
        client_ip: Option<&str>,
    ) -> Result<ShortenOutcome, AppError> {
        let original_url = self.url_validator.validate(url)?;

        let custom_slug = custom_slug.filter(|s| !s.trim().is_empty());
        let is_custom = custom_slug.is_some();

        let link = match custom_slug {
            Some(raw) => {
                let slug = validate_custom_slug(raw)?;
                self.create_custom(slug, original_url, client_ip).await?
            }
            None => self.create_generated(original_url).await?,
        };

        tracing::info!(short_id = %link.short_id, custom = is_custom, "Short link created");

        let mut event = AnalyticsEvent::link_created(&link.short_id, &link.original_url, is_custom);
        if let Some(ip) = client_ip {
            event = event.with_ip_address(ip);
        }
        self.analytics.emit(event);

        Ok(ShortenOutcome {
            short_url: self.config.short_url(&link.short_id),
            short_id: link.short_id,
            original_url: link.original_url,
        })
    }

    async fn create_custom(
        &self,
        slug: String,
        original_url: String,
        client_ip: Option<&str>,
    ) -> Result<ShortLink, AppError> {
        let taken = self
            .link_repository
            .find_by_short_id(&slug)
            .await?
            .is_some();

        let result = if taken {
            Err(AppError::conflict(CUSTOM_SLUG_TAKEN_MESSAGE))
        } else {
            self.link_repository
                .create(NewShortLink {
                    short_id: slug.clone(),
                    original_url: original_url.clone(),
                })
                .await
        };

        match result {
            Err(AppError::Conflict { .. }) => {
                let mut event = AnalyticsEvent::custom_link_failed(
                    &slug,
                    &original_url,
                    CUSTOM_SLUG_TAKEN_MESSAGE,
                );
                if let Some(ip) = client_ip {
                    event = event.with_ip_address(ip);
                }
                self.analytics.emit(event);

                Err(AppError::conflict(CUSTOM_SLUG_TAKEN_MESSAGE))
            }
            other => other,
        }
    }

    /// Inserts under a freshly generated id, retrying on collisions.
    ///
    /// A collision is either an id found by the pre-check or a unique
    /// violation raised by a concurrent insert.
    async fn create_generated(&self, original_url: String) -> Result<ShortLink, AppError> {
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let short_id = generate_short_id_with_length(self.config.short_id_length);

            if self
                .link_repository
                .find_by_short_id(&short_id)
                .await?
                .is_some()
            {
                tracing::debug!(attempt, %short_id, "Generated short id collided");
                continue;
            }

            match self
                .link_repository
                .create(NewShortLink {
                    short_id,
                    original_url: original_url.clone(),
                })
                .await
            {
                Ok(link) => return Ok(link),
                Err(AppError::Conflict { .. }) => {
                    tracing::debug!(attempt, "Generated short id taken by concurrent insert");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(format!(
            "Failed to allocate a unique short id after {MAX_GENERATION_ATTEMPTS} attempts"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analytics::AnalyticsEventType;
    use crate::domain::repositories::MockLinkRepository;
    use chrono::Utc;

    fn test_config() -> Arc<Config> {
        Arc::new(Config {
            brand_url: "https://sho.rt".to_string(),
            brand_host: "sho.rt".to_string(),
            ..Config::default()
        })
    }

    fn stored(new_link: &NewShortLink) -> ShortLink {
        ShortLink::new(
            new_link.short_id.clone(),
            new_link.original_url.clone(),
            Utc::now(),
            0,
            0,
        )
    }

    fn existing(short_id: &str) -> ShortLink {
        ShortLink::new(
            short_id.to_string(),
            "https://other.com/".to_string(),
            Utc::now(),
            3,
            7,
        )
    }

    #[tokio::test]
    async fn test_shorten_generated_success() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_short_id()
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_create()
            .withf(|l| {
                l.short_id.len() == 6
                    && l.short_id.chars().all(|c| c.is_ascii_alphanumeric())
                    && l.original_url == "https://example.com/"
            })
            .times(1)
            .returning(|l| Ok(stored(&l)));

        let (analytics, mut rx) = AnalyticsDispatcher::channel(8);
        let service = ShortenService::new(Arc::new(repo), analytics, test_config());

        let outcome = service
            .shorten("example.com", None, Some("203.0.113.1"))
            .await
            .unwrap();

        assert_eq!(outcome.original_url, "https://example.com/");
        assert_eq!(
            outcome.short_url,
            format!("https://sho.rt/s/{}", outcome.short_id)
        );

        let event = rx.try_recv().unwrap();
        assert_eq!(event.event_type, AnalyticsEventType::LinkCreated);
        assert_eq!(event.custom_alias, Some(false));
        assert_eq!(event.ip_address.as_deref(), Some("203.0.113.1"));
    }

    #[tokio::test]
    async fn test_shorten_invalid_url_skips_storage() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_short_id().times(0);
        repo.expect_create().times(0);

        let service = ShortenService::new(
            Arc::new(repo),
            AnalyticsDispatcher::disabled(),
            test_config(),
        );

        let err = service.shorten("http://localhost", None, None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(
            err.to_string(),
            "Local and private IP addresses are not allowed"
        );
    }

    #[tokio::test]
    async fn test_shorten_custom_slug_is_normalized() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_short_id()
            .withf(|id| id == "my-link")
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_create()
            .withf(|l| l.short_id == "my-link")
            .times(1)
            .returning(|l| Ok(stored(&l)));

        let (analytics, mut rx) = AnalyticsDispatcher::channel(8);
        let service = ShortenService::new(Arc::new(repo), analytics, test_config());

        let outcome = service
            .shorten("https://example.com/page", Some("  My-Link "), None)
            .await
            .unwrap();

        assert_eq!(outcome.short_id, "my-link");
        assert_eq!(outcome.short_url, "https://sho.rt/s/my-link");
        assert_eq!(rx.try_recv().unwrap().custom_alias, Some(true));
    }

    #[tokio::test]
    async fn test_shorten_blank_custom_slug_generates() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_short_id().returning(|_| Ok(None));
        repo.expect_create()
            .times(1)
            .returning(|l| Ok(stored(&l)));

        let service = ShortenService::new(
            Arc::new(repo),
            AnalyticsDispatcher::disabled(),
            test_config(),
        );

        let outcome = service
            .shorten("https://example.com", Some("   "), None)
            .await
            .unwrap();
        assert_eq!(outcome.short_id.len(), 6);
    }

    #[tokio::test]
    async fn test_shorten_invalid_custom_slug() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create().times(0);

        let service = ShortenService::new(
            Arc::new(repo),
            AnalyticsDispatcher::disabled(),
            test_config(),
        );

        let err = service
            .shorten("https://example.com", Some("--bad--"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_shorten_custom_slug_conflict() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_short_id()
            .withf(|id| id == "taken")
            .times(1)
            .returning(|id| Ok(Some(existing(id))));
        repo.expect_create().times(0);

        let (analytics, mut rx) = AnalyticsDispatcher::channel(8);
        let service = ShortenService::new(Arc::new(repo), analytics, test_config());

        let err = service
            .shorten("https://example.com", Some("taken"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
        assert_eq!(err.to_string(), CUSTOM_SLUG_TAKEN_MESSAGE);
        assert_eq!(
            rx.try_recv().unwrap().event_type,
            AnalyticsEventType::CustomLinkFailed
        );
    }

    #[tokio::test]
    async fn test_shorten_custom_slug_lost_race() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_short_id().returning(|_| Ok(None));
        repo.expect_create()
            .times(1)
            .returning(|_| Err(AppError::conflict("Unique constraint violation")));

        let service = ShortenService::new(
            Arc::new(repo),
            AnalyticsDispatcher::disabled(),
            test_config(),
        );

        let err = service
            .shorten("https://example.com", Some("racy"), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), CUSTOM_SLUG_TAKEN_MESSAGE);
    }

    #[tokio::test]
    async fn test_shorten_retries_generated_collisions() {
        let mut repo = MockLinkRepository::new();
        let mut seq = mockall::Sequence::new();

        repo.expect_find_by_short_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id| Ok(Some(existing(id))));
        repo.expect_find_by_short_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));
        repo.expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::conflict("Unique constraint violation")));
        repo.expect_find_by_short_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));
        repo.expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|l| Ok(stored(&l)));

        let service = ShortenService::new(
            Arc::new(repo),
            AnalyticsDispatcher::disabled(),
            test_config(),
        );

        assert!(service.shorten("https://example.com", None, None).await.is_ok());
    }

    #[tokio::test]
    async fn test_shorten_gives_up_after_max_attempts() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_short_id()
            .times(MAX_GENERATION_ATTEMPTS)
            .returning(|id| Ok(Some(existing(id))));
        repo.expect_create().times(0);

        let service = ShortenService::new(
            Arc::new(repo),
            AnalyticsDispatcher::disabled(),
            test_config(),
        );

        let err = service
            .shorten("https://example.com", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_shorten_storage_error_propagates() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_short_id()
            .returning(|_| Err(AppError::internal("connection refused")));

        let service = ShortenService::new(
            Arc::new(repo),
            AnalyticsDispatcher::disabled(),
            test_config(),
        );

        let err = service
            .shorten("https://example.com", None, None)
            .await
            .unwrap_err();
        assert_eq!(err.public_message(), "Internal server error");
    }
}
