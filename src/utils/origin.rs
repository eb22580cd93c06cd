//! Same-origin checks for browser-originated requests.

use axum::http::{HeaderMap, header};
use url::Url;

/// Extracts the authority (`host[:port]`) from the `Host` header, lowercased.
pub fn host_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(|h| h.trim().to_ascii_lowercase())
        .filter(|h| !h.is_empty())
}

/// Parsed `Origin` header value.
struct OriginEndpoint {
    host: String,
    port: u16,
    default_port: u16,
}

/// Returns `None` for opaque origins such as `null`.
fn origin_endpoint(origin: &str) -> Option<OriginEndpoint> {
    let url = Url::parse(origin).ok()?;
    let default_port = match url.scheme() {
        "http" => 80,
        "https" => 443,
        _ => return None,
    };

    Some(OriginEndpoint {
        host: url.host_str()?.to_ascii_lowercase(),
        port: url.port().unwrap_or(default_port),
        default_port,
    })
}

/// Splits a `Host` header value into host and optional port.
///
/// Bracketed IPv6 literals keep their brackets, matching `Url::host_str`.
fn split_host_header(authority: &str) -> (&str, Option<&str>) {
    match authority.rfind(':') {
        Some(idx) if !authority[idx..].contains(']') => {
            (&authority[..idx], Some(&authority[idx + 1..]))
        }
        _ => (authority, None),
    }
}

/// Returns whether the request's declared origin matches the serving host.
///
/// Requests without an `Origin` header (non-browser clients) pass. A `Host`
/// without a port is taken to use the default port of the origin's scheme.
/// A present but unparsable origin, or a missing `Host`, fails.
pub fn is_same_origin(headers: &HeaderMap) -> bool {
    let Some(origin) = headers.get(header::ORIGIN) else {
        return true;
    };

    let Some(origin) = origin.to_str().ok().and_then(origin_endpoint) else {
        return false;
    };

    let Some(host) = host_from_headers(headers) else {
        return false;
    };

    let (host, port) = split_host_header(&host);
    let port = match port {
        Some(p) => match p.parse::<u16>() {
            Ok(p) => p,
            Err(_) => return false,
        },
        None => origin.default_port,
    };

    host == origin.host && port == origin.port
}
