//! Handler for short URL resolution.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};

use crate::application::services::Resolution;
use crate::state::AppState;
use crate::utils::client_ip::client_ip_from_headers;
use crate::web::{InterstitialTemplate, NotFoundTemplate};

/// Resolves a short id.
///
/// # Endpoint
///
/// `GET {short_path}/{short_id}` (default prefix `/s`)
///
/// # Responses
///
/// - **307** straight to the destination while the link is below the
///   interstitial threshold or the interstitial is disabled
/// - **200** interstitial page with a countdown otherwise
/// - **400** HTML page for malformed ids
/// - **404** HTML page for unknown ids
/// - **500** JSON error on storage failure
pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(short_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let client_ip = client_ip_from_headers(&headers);

    let resolution = match state
        .redirect_service
        .resolve(&short_id, Some(client_ip.as_str()))
        .await
    {
        Ok(resolution) => resolution,
        Err(e) => return e.into_response(),
    };

    let config = state.config.as_ref();

    match resolution {
        Resolution::Invalid => (
            StatusCode::BAD_REQUEST,
            NotFoundTemplate::invalid(config),
        )
            .into_response(),
        Resolution::NotFound => (
            StatusCode::NOT_FOUND,
            NotFoundTemplate::missing(config, &short_id),
        )
            .into_response(),
        Resolution::Redirect(link) => Redirect::temporary(&link.original_url).into_response(),
        Resolution::Interstitial {
            link,
            timer_seconds,
        } => InterstitialTemplate::new(config, &link, timer_seconds).into_response(),
    }
}
