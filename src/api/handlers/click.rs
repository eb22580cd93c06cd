//! Handler for click registration endpoint.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::click::ClickResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Counts a visitor continuing from the interstitial page.
///
/// # Endpoint
///
/// `POST /api/urls/{short_id}/click`
///
/// # Response
///
/// ```json
/// { "success": true, "clicks": 12 }
/// ```
///
/// # Errors
///
/// - 400 if the id contains disallowed characters
/// - 404 if no link has this id
pub async fn click_handler(
    State(state): State<AppState>,
    Path(short_id): Path<String>,
) -> Result<Json<ClickResponse>, AppError> {
    let link = state.redirect_service.register_click(&short_id).await?;

    Ok(Json(ClickResponse {
        success: true,
        clicks: link.clicks,
    }))
}
