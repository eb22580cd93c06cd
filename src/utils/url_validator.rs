//! Destination URL screening and normalization.
//!
//! Checks run in a fixed order and the first failure wins, so the caller
//! always gets the same message for the same input. Cheap structural checks
//! come before the blocklist scans.

use regex::Regex;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;
use url::{Host, Url};

use crate::config::Config;
use crate::error::AppError;
use crate::utils::blocklist::{BLOCKLIST, Blocklist};

/// Absolute http(s) URL with a non-empty authority and no whitespace.
static ABSOLUTE_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://[^\s/?#]+[^\s]*$").unwrap());

static SCHEME_PREFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").unwrap());

/// Host substrings typical for credential-harvesting pages.
const SUSPICIOUS_HOST_KEYWORDS: &[&str] = &[
    "login", "signin", "account", "password", "banking", "verify",
];

const MIN_URL_LENGTH: usize = 3;

/// Reasons a destination URL is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlValidationError {
    #[error("URL is required")]
    Empty,

    #[error("Invalid URL format")]
    InvalidFormat,

    #[error("Cannot shorten URLs pointing to this service")]
    SelfReferential,

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("Invalid domain format")]
    InvalidDomain,

    #[error("Local and private IP addresses are not allowed")]
    PrivateAddress,

    #[error("This domain has been blocked")]
    BlockedDomain,

    #[error("This top-level domain is not allowed")]
    BlockedTld,

    #[error("This URL contains blocked content")]
    BlockedKeyword,

    #[error("This URL may be potentially harmful")]
    Suspicious,

    #[error("URL is too short")]
    TooShort,

    #[error("URL is too long (maximum {max} characters)")]
    TooLong { max: usize },
}

impl From<UrlValidationError> for AppError {
    fn from(e: UrlValidationError) -> Self {
        AppError::bad_request(e.to_string())
    }
}

/// Validates and normalizes destination URLs.
#[derive(Debug, Clone)]
pub struct UrlValidator {
    brand_host: String,
    max_length: usize,
    phishing_heuristic: bool,
    blocklist: &'static Blocklist,
}

impl UrlValidator {
    /// Creates a validator.
    ///
    /// `brand_host` may carry a port; only the host part is compared.
    pub fn new(brand_host: &str, max_length: usize, phishing_heuristic: bool) -> Self {
        let host = brand_host.split(':').next().unwrap_or(brand_host);
        Self {
            brand_host: host.to_ascii_lowercase(),
            max_length,
            phishing_heuristic,
            blocklist: &BLOCKLIST,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.brand_host,
            config.max_url_length,
            config.phishing_heuristic_enabled,
        )
    }

    /// Validates `input` and returns the normalized URL.
    ///
    /// Inputs without an `http://` or `https://` prefix get `https://` prepended.
    ///
    /// # Errors
    ///
    /// Returns the first [`UrlValidationError`] hit, in this order: empty input,
    /// malformed shape, own host, scheme, local/private target, domain shape,
    /// blocklist (domain, TLD, keyword), suspicious keyword, length.
    pub fn validate(&self, input: &str) -> Result<String, UrlValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(UrlValidationError::Empty);
        }

        let candidate = if SCHEME_PREFIX_REGEX.is_match(trimmed) {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        };

        if !ABSOLUTE_URL_REGEX.is_match(&candidate) {
            return Err(UrlValidationError::InvalidFormat);
        }

        let url = Url::parse(&candidate).map_err(|_| UrlValidationError::InvalidFormat)?;
        let host = url.host().ok_or(UrlValidationError::InvalidFormat)?;
        let host_str = host_text(&host);

        if self.is_own_host(&host_str) {
            return Err(UrlValidationError::SelfReferential);
        }

        if !matches!(url.scheme(), "http" | "https") {
            return Err(UrlValidationError::UnsupportedProtocol);
        }

        // Runs before the domain-shape rule so `localhost` and IPv6 literals
        // report the private-address error.
        if is_local_or_private(&host, &host_str) {
            return Err(UrlValidationError::PrivateAddress);
        }

        if !host_str.contains('.') {
            return Err(UrlValidationError::InvalidDomain);
        }

        if self.blocklist.blocked_domain(&host_str).is_some() {
            return Err(UrlValidationError::BlockedDomain);
        }
        if self.blocklist.blocked_tld(&host_str).is_some() {
            return Err(UrlValidationError::BlockedTld);
        }
        if self.blocklist.blocked_keyword(&host_str).is_some() {
            return Err(UrlValidationError::BlockedKeyword);
        }

        if self.phishing_heuristic
            && SUSPICIOUS_HOST_KEYWORDS
                .iter()
                .any(|kw| host_str.contains(kw))
        {
            return Err(UrlValidationError::Suspicious);
        }

        let length = candidate.chars().count();
        if length < MIN_URL_LENGTH {
            return Err(UrlValidationError::TooShort);
        }
        if length > self.max_length {
            return Err(UrlValidationError::TooLong {
                max: self.max_length,
            });
        }

        Ok(url.to_string())
    }

    fn is_own_host(&self, host: &str) -> bool {
        host == self.brand_host
            || host
                .strip_prefix("www.")
                .is_some_and(|bare| bare == self.brand_host)
    }
}

/// Lowercased textual host. IPv6 literals are rendered without brackets.
///
/// Trailing dots of a fully qualified name are dropped, so `localhost.`
/// is screened as `localhost`.
fn host_text(host: &Host<&str>) -> String {
    match host {
        Host::Domain(d) => d.trim_end_matches('.').to_ascii_lowercase(),
        Host::Ipv4(addr) => addr.to_string(),
        Host::Ipv6(addr) => addr.to_string(),
    }
}

fn is_local_or_private(host: &Host<&str>, host_str: &str) -> bool {
    match host {
        Host::Ipv4(addr) => is_private_ipv4(addr),
        Host::Ipv6(addr) => is_private_ipv6(addr),
        Host::Domain(_) => is_local_domain(host_str),
    }
}

fn is_private_ipv4(addr: &Ipv4Addr) -> bool {
    addr.is_loopback() || addr.is_private() || addr.is_unspecified() || addr.is_link_local()
}

fn is_private_ipv6(addr: &Ipv6Addr) -> bool {
    if let Some(v4) = addr.to_ipv4_mapped() {
        return is_private_ipv4(&v4);
    }
    let first = addr.segments()[0];
    addr.is_loopback()
        || addr.is_unspecified()
        || (first & 0xfe00) == 0xfc00
        || (first & 0xffc0) == 0xfe80
}

/// Name-based local targets plus hosts that merely start with a private prefix.
fn is_local_domain(domain: &str) -> bool {
    if domain == "localhost" || domain.ends_with(".localhost") || domain.ends_with(".local") {
        return true;
    }

    if domain.starts_with("127.")
        || domain.starts_with("10.")
        || domain.starts_with("192.168.")
        || domain.starts_with("0.0.0.0")
    {
        return true;
    }

    if let Some(rest) = domain.strip_prefix("172.")
        && let Some(second) = rest.split('.').next()
        && let Ok(octet) = second.parse::<u8>()
    {
        return (16..=31).contains(&octet);
    }

    false
}

/// Returns true for addresses that never leave the host or private network.
pub fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_private_ipv4(v4),
        IpAddr::V6(v6) => is_private_ipv6(v6),
    }
}
