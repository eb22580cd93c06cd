//! Handler for frontend analytics ingestion.

use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{HeaderMap, header},
};
use validator::Validate;

use crate::api::dto::analytics::{AnalyticsAck, AnalyticsRequest};
use crate::api::handlers::shorten::reject_body;
use crate::domain::analytics::{AnalyticsEvent, AnalyticsEventType};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip_from_headers;

/// Accepts an analytics event from a frontend.
///
/// # Endpoint
///
/// `POST /api/analytics`
///
/// # Request Body
///
/// ```json
/// { "type": "ad_clicked", "shortId": "abc123" }
/// ```
///
/// The server stamps the time and client address. When the request has no
/// `referrer` field the `Referer` header is used. Events are dispatched
/// without waiting for storage, and silently dropped when analytics is off.
///
/// # Errors
///
/// Returns 400 for malformed JSON, field limits or an unknown event type.
pub async fn analytics_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<AnalyticsAck>, AppError> {
    let body = body.map_err(reject_body)?;

    let payload: AnalyticsRequest = serde_json::from_slice(&body)
        .map_err(|_| AppError::bad_request("Invalid JSON body"))?;
    payload.validate()?;

    let event_type: AnalyticsEventType = payload
        .event_type
        .parse()
        .map_err(|e: crate::domain::analytics::UnknownEventType| {
            AppError::bad_request(e.to_string())
        })?;

    let mut event = AnalyticsEvent::new(event_type)
        .with_ip_address(client_ip_from_headers(&headers));
    event.short_id = payload.short_id;
    event.url = payload.url;
    event.custom_alias = payload.custom_alias;
    event.error_message = payload.error_message;
    event.referrer = payload.referrer.or_else(|| {
        headers
            .get(header::REFERER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    });

    state.analytics.emit(event);

    Ok(Json(AnalyticsAck { success: true }))
}
