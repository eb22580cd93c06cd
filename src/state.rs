//! Shared application state injected into handlers and middleware.

use std::sync::Arc;

use crate::application::services::{RedirectService, ShortenService};
use crate::config::Config;
use crate::domain::analytics_worker::AnalyticsDispatcher;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::rate_limit::RateLimitStore;

/// Application state built once by the composition root.
///
/// Cloning is cheap: every field is reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub shorten_service: Arc<ShortenService>,
    pub redirect_service: Arc<RedirectService>,
    pub link_repository: Arc<dyn LinkRepository>,
    pub rate_limiter: Arc<dyn RateLimitStore>,
    pub analytics: AnalyticsDispatcher,
}

impl AppState {
    /// Wires services on top of the given collaborators.
    pub fn new(
        config: Arc<Config>,
        link_repository: Arc<dyn LinkRepository>,
        rate_limiter: Arc<dyn RateLimitStore>,
        analytics: AnalyticsDispatcher,
    ) -> Self {
        let shorten_service = Arc::new(ShortenService::new(
            link_repository.clone(),
            analytics.clone(),
            config.clone(),
        ));
        let redirect_service = Arc::new(RedirectService::new(
            link_repository.clone(),
            analytics.clone(),
            config.clone(),
        ));

        Self {
            config,
            shorten_service,
            redirect_service,
            link_repository,
            rate_limiter,
            analytics,
        }
    }
}
