//! Handler for link shortening endpoint.

use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{HeaderMap, StatusCode},
};

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::api::middleware::request_guard::BODY_TOO_LARGE_MESSAGE;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip_from_headers;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "example.com", "customUrl": "my-link" }
/// ```
///
/// `customUrl` is optional.
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "originalUrl": "https://example.com/",
///   "shortUrl": "https://sho.rt/s/my-link",
///   "shortId": "my-link"
/// }
/// ```
///
/// # Errors
///
/// - 400 for malformed JSON, rejected URLs and invalid custom slugs
/// - 409 if the custom slug is taken
/// - 413 if the body exceeds the configured limit
pub async fn shorten_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    let body = body.map_err(reject_body)?;

    let payload: ShortenRequest = serde_json::from_slice(&body)
        .map_err(|_| AppError::bad_request("Invalid JSON body"))?;

    let client_ip = client_ip_from_headers(&headers);

    let outcome = state
        .shorten_service
        .shorten(
            &payload.url,
            payload.custom_url.as_deref(),
            Some(client_ip.as_str()),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// Maps a body buffering failure to the matching client error.
pub(crate) fn reject_body(rejection: BytesRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large(BODY_TOO_LARGE_MESSAGE)
    } else {
        AppError::bad_request(rejection.body_text())
    }
}
