//! Client key derivation for rate limiting.

use axum::http::HeaderMap;

/// Key used when no client address header is present.
pub const FALLBACK_CLIENT_IP: &str = "127.0.0.1";

/// Derives the client identifier from proxy headers.
///
/// Precedence:
/// 1. `x-real-ip`
/// 2. first entry of `x-forwarded-for`
/// 3. `cf-connecting-ip`
/// 4. [`FALLBACK_CLIENT_IP`]
///
/// Empty or non-UTF-8 header values are skipped.
pub fn client_ip_from_headers(headers: &HeaderMap) -> String {
    header_value(headers, "x-real-ip")
        .or_else(|| {
            header_value(headers, "x-forwarded-for")
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .or_else(|| header_value(headers, "cf-connecting-ip"))
        .unwrap_or(FALLBACK_CLIENT_IP)
        .to_string()
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
