//! API route configuration.

use crate::api::handlers::{analytics_handler, click_handler, shorten_handler};
use crate::api::middleware::request_guard::{json_guard, same_origin_guard};
use crate::state::AppState;
use axum::{Router, extract::DefaultBodyLimit, middleware, routing::post};

/// All API routes, nested under `/api`.
///
/// # Endpoints
///
/// - `POST /shorten`              - Create a short link
/// - `POST /analytics`            - Ingest a frontend analytics event
/// - `POST /urls/{short_id}/click` - Count a follow-through from the interstitial
///
/// JSON endpoints are gated on body size, content type and origin before the
/// body is read; the click endpoint only checks the origin.
pub fn routes(max_body_bytes: usize) -> Router<AppState> {
    let json_routes = Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/analytics", post(analytics_handler))
        .route_layer(middleware::from_fn_with_state(max_body_bytes, json_guard))
        .layer(DefaultBodyLimit::max(max_body_bytes));

    let click_routes = Router::new()
        .route("/urls/{short_id}/click", post(click_handler))
        .route_layer(middleware::from_fn(same_origin_guard));

    Router::new().merge(json_routes).merge(click_routes)
}
