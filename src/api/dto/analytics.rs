//! DTOs for analytics ingestion endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Event reported by a frontend.
///
/// `type` must be one of the known analytics event types; the timestamp and
/// client address are stamped server-side.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsRequest {
    #[serde(rename = "type", default)]
    #[validate(length(min = 1, max = 64, message = "Event type is required"))]
    pub event_type: String,

    #[serde(alias = "linkId")]
    #[validate(length(max = 64, message = "Short id is too long"))]
    pub short_id: Option<String>,

    #[validate(length(max = 2048, message = "URL is too long"))]
    pub url: Option<String>,

    pub custom_alias: Option<bool>,

    #[validate(length(max = 2048, message = "Referrer is too long"))]
    pub referrer: Option<String>,

    #[validate(length(max = 1024, message = "Error message is too long"))]
    pub error_message: Option<String>,
}

/// Acknowledgement for an accepted event.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyticsAck {
    pub success: bool,
}
