//! Analytics event model and sink contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of analytics event.
///
/// Serialized as `snake_case` strings, which are also the values stored in
/// the `event_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsEventType {
    SiteVisit,
    LinkCreated,
    CustomLinkCreated,
    LinkOpened,
    AdClicked,
    AdSkipped,
    AdWaited,
    CustomLinkFailed,
    CustomLinkDeleted,
    Error,
}

impl AnalyticsEventType {
    pub const ALL: [AnalyticsEventType; 10] = [
        Self::SiteVisit,
        Self::LinkCreated,
        Self::CustomLinkCreated,
        Self::LinkOpened,
        Self::AdClicked,
        Self::AdSkipped,
        Self::AdWaited,
        Self::CustomLinkFailed,
        Self::CustomLinkDeleted,
        Self::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SiteVisit => "site_visit",
            Self::LinkCreated => "link_created",
            Self::CustomLinkCreated => "custom_link_created",
            Self::LinkOpened => "link_opened",
            Self::AdClicked => "ad_clicked",
            Self::AdSkipped => "ad_skipped",
            Self::AdWaited => "ad_waited",
            Self::CustomLinkFailed => "custom_link_failed",
            Self::CustomLinkDeleted => "custom_link_deleted",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for AnalyticsEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown analytics event type: {0}")]
pub struct UnknownEventType(pub String);

impl FromStr for AnalyticsEventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownEventType(s.to_string()))
    }
}

/// A single analytics record.
///
/// Only `event_type` and `timestamp` are always present; everything else
/// depends on where the event was raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub event_type: AnalyticsEventType,
    pub short_id: Option<String>,
    pub url: Option<String>,
    pub custom_alias: Option<bool>,
    pub ip_address: Option<String>,
    pub referrer: Option<String>,
    pub error_message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AnalyticsEvent {
    /// Creates an event of the given type stamped with the current time.
    pub fn new(event_type: AnalyticsEventType) -> Self {
        Self {
            event_type,
            short_id: None,
            url: None,
            custom_alias: None,
            ip_address: None,
            referrer: None,
            error_message: None,
            timestamp: Utc::now(),
        }
    }

    /// `link_created` for a freshly stored link.
    pub fn link_created(short_id: &str, url: &str, custom_alias: bool) -> Self {
        Self::new(AnalyticsEventType::LinkCreated)
            .with_short_id(short_id)
            .with_url(url)
            .with_custom_alias(custom_alias)
    }

    /// `custom_link_failed` when a requested slug was already taken.
    pub fn custom_link_failed(short_id: &str, url: &str, reason: &str) -> Self {
        Self::new(AnalyticsEventType::CustomLinkFailed)
            .with_short_id(short_id)
            .with_url(url)
            .with_custom_alias(true)
            .with_error_message(reason)
    }

    /// `link_opened` for a successful resolution.
    pub fn link_opened(short_id: &str, url: &str) -> Self {
        Self::new(AnalyticsEventType::LinkOpened)
            .with_short_id(short_id)
            .with_url(url)
    }

    pub fn with_short_id(mut self, short_id: impl Into<String>) -> Self {
        self.short_id = Some(short_id.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_custom_alias(mut self, custom_alias: bool) -> Self {
        self.custom_alias = Some(custom_alias);
        self
    }

    pub fn with_ip_address(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }

    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

/// Failure while persisting an analytics event.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("analytics storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for AnalyticsError {
    fn from(e: sqlx::Error) -> Self {
        AnalyticsError::Storage(e.to_string())
    }
}

/// Destination for analytics events.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgAnalyticsSink`] - PostgreSQL table
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn record(&self, event: &AnalyticsEvent) -> Result<(), AnalyticsError>;
}
