//! Short link resolution and click registration.

use std::sync::Arc;

use crate::config::Config;
use crate::domain::analytics::AnalyticsEvent;
use crate::domain::analytics_worker::AnalyticsDispatcher;
use crate::domain::entities::ShortLink;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::short_id::is_resolvable_short_id;

/// Outcome of resolving a short id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Identifier contains characters outside the allowed set.
    Invalid,
    /// No link is stored under this identifier.
    NotFound,
    /// Visitor goes straight to the destination; `clicks` already counted.
    Redirect(ShortLink),
    /// Visitor sees the countdown page first.
    Interstitial { link: ShortLink, timer_seconds: u32 },
}

/// Service resolving short ids and maintaining visit counters.
pub struct RedirectService {
    link_repository: Arc<dyn LinkRepository>,
    analytics: AnalyticsDispatcher,
    config: Arc<Config>,
}

impl RedirectService {
    /// Creates a new redirect service.
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        analytics: AnalyticsDispatcher,
        config: Arc<Config>,
    ) -> Self {
        Self {
            link_repository,
            analytics,
            config,
        }
    }

    /// Resolves a raw path segment.
    ///
    /// Every resolution of an existing link increments `accesses`. The
    /// interstitial is skipped when disabled or while the access count before
    /// this visit is at or below the configured threshold; in that case
    /// `clicks` is incremented as well.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn resolve(
        &self,
        raw_short_id: &str,
        client_ip: Option<&str>,
    ) -> Result<Resolution, AppError> {
        if !is_resolvable_short_id(raw_short_id) {
            tracing::debug!(raw = %raw_short_id, "Rejected invalid short id");
            return Ok(Resolution::Invalid);
        }

        let Some(link) = self
            .link_repository
            .increment_accesses(raw_short_id)
            .await?
        else {
            return Ok(Resolution::NotFound);
        };

        let mut event = AnalyticsEvent::link_opened(&link.short_id, &link.original_url);
        if let Some(ip) = client_ip {
            event = event.with_ip_address(ip);
        }
        self.analytics.emit(event);

        if self.should_skip_interstitial(&link) {
            return Ok(match self.link_repository.increment_clicks(&link.short_id).await? {
                Some(updated) => Resolution::Redirect(updated),
                None => Resolution::NotFound,
            });
        }

        Ok(Resolution::Interstitial {
            link,
            timer_seconds: self.config.interstitial_timer_seconds,
        })
    }

    /// Counts a follow-through from the interstitial page.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a malformed id.
    /// Returns [`AppError::NotFound`] if the link does not exist.
    pub async fn register_click(&self, raw_short_id: &str) -> Result<ShortLink, AppError> {
        if !is_resolvable_short_id(raw_short_id) {
            return Err(AppError::bad_request("Invalid short URL"));
        }

        self.link_repository
            .increment_clicks(raw_short_id)
            .await?
            .ok_or_else(|| AppError::not_found("URL not found"))
    }

    fn should_skip_interstitial(&self, link: &ShortLink) -> bool {
        !self.config.interstitial_enabled
            || link.previous_accesses() <= self.config.interstitial_threshold
    }
}
