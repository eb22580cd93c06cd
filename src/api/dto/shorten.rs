//! DTOs for link shortening endpoint.

use serde::{Deserialize, Serialize};

use crate::application::services::ShortenOutcome;

/// Request to shorten a single URL.
///
/// A missing `url` deserializes to an empty string so it is reported by the
/// URL validator rather than as malformed JSON.
#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    #[serde(default)]
    pub url: String,

    /// Optional custom short id.
    #[serde(default, rename = "customUrl")]
    pub custom_url: Option<String>,
}

/// Successful shortening response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenResponse {
    pub original_url: String,
    pub short_url: String,
    pub short_id: String,
}

impl From<ShortenOutcome> for ShortenResponse {
    fn from(outcome: ShortenOutcome) -> Self {
        Self {
            original_url: outcome.original_url,
            short_url: outcome.short_url,
            short_id: outcome.short_id,
        }
    }
}
