//! Pre-parse gates for JSON API requests.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::utils::origin::is_same_origin;

pub const BODY_TOO_LARGE_MESSAGE: &str = "Request body too large";
pub const UNSUPPORTED_CONTENT_TYPE_MESSAGE: &str = "Content-Type must be application/json";
pub const CROSS_ORIGIN_MESSAGE: &str = "Cross-origin requests are not allowed";

/// Rejects oversized, non-JSON or cross-origin requests before any I/O.
///
/// Checks run in order: declared `Content-Length` against `max_body_bytes`,
/// `Content-Type`, then the `Origin` header. Bodies without a declared length
/// are capped by the route's body limit instead.
pub async fn json_guard(
    State(max_body_bytes): State<usize>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let headers = req.headers();

    if declared_length(headers).is_some_and(|len| len > max_body_bytes) {
        return Err(AppError::payload_too_large(BODY_TOO_LARGE_MESSAGE));
    }

    if !is_json_content_type(headers) {
        return Err(AppError::unsupported_media_type(
            UNSUPPORTED_CONTENT_TYPE_MESSAGE,
        ));
    }

    if !is_same_origin(headers) {
        tracing::warn!(origin = ?headers.get(header::ORIGIN), "Rejected cross-origin request");
        return Err(AppError::forbidden(CROSS_ORIGIN_MESSAGE));
    }

    Ok(next.run(req).await)
}

/// Rejects cross-origin requests on bodiless state-changing endpoints.
pub async fn same_origin_guard(req: Request, next: Next) -> Result<Response, AppError> {
    if !is_same_origin(req.headers()) {
        tracing::warn!(origin = ?req.headers().get(header::ORIGIN), "Rejected cross-origin request");
        return Err(AppError::forbidden(CROSS_ORIGIN_MESSAGE));
    }

    Ok(next.run(req).await)
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}
