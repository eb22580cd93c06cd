//! Application configuration loaded from environment variables.
//!
//! Configuration is assembled once at startup, validated, and then handed by
//! reference to every component constructor. Nothing else reads the environment.
//!
//! ## Required Variables
//!
//! - `APP_URL` - public base URL of the service (e.g. `https://sho.rt`)
//! - Either `DATABASE_URL` or all of (`DB_HOST`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`)
//!
//! ## Optional Variables
//!
//! - `APP_NAME` - brand name rendered on the interstitial page
//! - `APP_DOMAIN` - brand host used for self-reference checks (default: host of `APP_URL`)
//! - `REDIS_URL` / `REDIS_HOST` - sliding-window counter store. When unset, rate
//!   limiting fails open.
//! - `LISTEN` - Bind address (default: `0.0.0.0:3000`)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)
//! - `SHORT_URL_PATH` - path prefix for short links (default: `/s`)
//! - `MAX_URL_LENGTH` - longest accepted destination URL (default: 2048)
//! - `SHORT_URL_LENGTH` - length of generated short ids (default: 6)
//! - `RATE_LIMIT_REQUESTS` / `RATE_LIMIT_WINDOW_MS` - sliding window (default: 20 per 10000 ms)
//! - `REDIRECT_PAGE_ENABLED` - interstitial page toggle (default: `true`)
//! - `REDIRECT_PAGE_TIMER_DURATION` - interstitial countdown in seconds (default: 15)
//! - `REDIRECT_PAGE_SHOW_ONLY_AFTER_X_ACCESSES` - accesses before the interstitial kicks in (default: 10)
//! - `ENABLE_ANALYTICS` - analytics event emission (default: `false`)
//! - `ANALYTICS_QUEUE_CAPACITY` - analytics event buffer (default: 10000)
//! - `PHISHING_HEURISTIC_ENABLED` - suspicious host keyword check (default: `true`)
//! - `MAX_BODY_BYTES` - request body limit for JSON endpoints (default: 10240)

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub listen_addr: String,
    pub log_level: String,
    pub log_format: String,

    // ── Brand ───────────────────────────────────────────────────────────────
    pub brand_name: String,
    /// Public base URL used to compose short URLs.
    pub brand_url: String,
    /// Host of the service itself. Destinations on this host are rejected.
    pub brand_host: String,

    // ── Shortening ──────────────────────────────────────────────────────────
    pub short_path_prefix: String,
    pub max_url_length: usize,
    pub short_id_length: usize,
    /// Enables the naive substring check for words like `login` or `verify`.
    /// Expect false positives on legitimate hosts.
    pub phishing_heuristic_enabled: bool,
    pub max_body_bytes: usize,

    // ── Rate limiting ───────────────────────────────────────────────────────
    pub rate_limit_requests: u32,
    pub rate_limit_window_ms: u64,

    // ── Interstitial ────────────────────────────────────────────────────────
    pub interstitial_enabled: bool,
    pub interstitial_timer_seconds: u32,
    /// Accesses (before the current one) that still redirect immediately.
    pub interstitial_threshold: i64,

    // ── Analytics ───────────────────────────────────────────────────────────
    pub analytics_enabled: bool,
    pub analytics_queue_capacity: usize,

    // ── Database pool ───────────────────────────────────────────────────────
    pub db_max_connections: u32,
    /// Seconds to wait for a pooled connection.
    pub db_connect_timeout: u64,
    /// Seconds an idle connection is kept.
    pub db_idle_timeout: u64,
    /// Seconds before any connection is recycled.
    pub db_max_lifetime: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost:5432/linkgate".to_string(),
            redis_url: None,
            listen_addr: "0.0.0.0:3000".to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            brand_name: "Linkgate".to_string(),
            brand_url: "http://localhost:3000".to_string(),
            brand_host: "localhost".to_string(),
            short_path_prefix: "/s".to_string(),
            max_url_length: 2048,
            short_id_length: 6,
            phishing_heuristic_enabled: true,
            max_body_bytes: 10 * 1024,
            rate_limit_requests: 20,
            rate_limit_window_ms: 10_000,
            interstitial_enabled: true,
            interstitial_timer_seconds: 15,
            interstitial_threshold: 10,
            analytics_enabled: false,
            analytics_queue_capacity: 10_000,
            db_max_connections: 10,
            db_connect_timeout: 30,
            db_idle_timeout: 600,
            db_max_lifetime: 1800,
        }
    }
}

/// Reads a variable and parses it, falling back to `default` when unset or malformed.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Reads a boolean flag (`true`/`1` are truthy, anything else is falsy).
fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(default)
}

impl Config {
    /// Reads every setting, applying defaults for optional ones.
    ///
    /// # Errors
    ///
    /// Returns an error if `APP_URL` or the database configuration is missing,
    /// or if `APP_URL` is not an absolute URL.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let database_url =
            Self::load_database_url().context("Database is not configured")?;
        let redis_url = Self::load_redis_url().context("Failed to load Redis configuration")?;

        let brand_url = env::var("APP_URL").context("APP_URL must be set")?;
        let brand_host = match env::var("APP_DOMAIN") {
            Ok(domain) if !domain.trim().is_empty() => domain.trim().to_ascii_lowercase(),
            _ => host_of(&brand_url).context("APP_URL must be an absolute URL with a host")?,
        };

        Ok(Self {
            database_url,
            redis_url,
            listen_addr: env::var("LISTEN").unwrap_or(defaults.listen_addr),
            log_level: env::var("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: env::var("LOG_FORMAT").unwrap_or(defaults.log_format),
            brand_name: env::var("APP_NAME").unwrap_or(defaults.brand_name),
            brand_url: brand_url.trim_end_matches('/').to_string(),
            brand_host,
            short_path_prefix: env::var("SHORT_URL_PATH")
                .map(|p| p.trim_end_matches('/').to_string())
                .unwrap_or(defaults.short_path_prefix),
            max_url_length: env_or("MAX_URL_LENGTH", defaults.max_url_length),
            short_id_length: env_or("SHORT_URL_LENGTH", defaults.short_id_length),
            phishing_heuristic_enabled: env_flag(
                "PHISHING_HEURISTIC_ENABLED",
                defaults.phishing_heuristic_enabled,
            ),
            max_body_bytes: env_or("MAX_BODY_BYTES", defaults.max_body_bytes),
            rate_limit_requests: env_or("RATE_LIMIT_REQUESTS", defaults.rate_limit_requests),
            rate_limit_window_ms: env_or("RATE_LIMIT_WINDOW_MS", defaults.rate_limit_window_ms),
            interstitial_enabled: env_flag("REDIRECT_PAGE_ENABLED", defaults.interstitial_enabled),
            interstitial_timer_seconds: env_or(
                "REDIRECT_PAGE_TIMER_DURATION",
                defaults.interstitial_timer_seconds,
            ),
            interstitial_threshold: env_or(
                "REDIRECT_PAGE_SHOW_ONLY_AFTER_X_ACCESSES",
                defaults.interstitial_threshold,
            ),
            analytics_enabled: env_flag("ENABLE_ANALYTICS", defaults.analytics_enabled),
            analytics_queue_capacity: env_or(
                "ANALYTICS_QUEUE_CAPACITY",
                defaults.analytics_queue_capacity,
            ),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", defaults.db_max_connections),
            db_connect_timeout: env_or("DB_CONNECT_TIMEOUT", defaults.db_connect_timeout),
            db_idle_timeout: env_or("DB_IDLE_TIMEOUT", defaults.db_idle_timeout),
            db_max_lifetime: env_or("DB_MAX_LIFETIME", defaults.db_max_lifetime),
        })
    }

    /// `DATABASE_URL`, or a URL assembled from `DB_*` parts.
    fn load_database_url() -> Result<String> {
        if let Ok(url) = env::var("DATABASE_URL") {
            return Ok(url);
        }

        let required = |key: &str| {
            env::var(key).with_context(|| format!("{key} must be set when DATABASE_URL is not provided"))
        };

        let parts = ConnectionParts {
            scheme: "postgres",
            host: env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env_or("DB_PORT", 5432),
            user: Some(required("DB_USER")?),
            password: Some(required("DB_PASSWORD")?),
            path: required("DB_NAME")?,
        };

        parts.to_url()
    }

    /// `REDIS_URL`, or a URL assembled from `REDIS_*` parts.
    ///
    /// `None` when neither `REDIS_URL` nor `REDIS_HOST` is set.
    fn load_redis_url() -> Result<Option<String>> {
        if let Ok(url) = env::var("REDIS_URL") {
            return Ok(Some(url));
        }

        let Ok(host) = env::var("REDIS_HOST") else {
            return Ok(None);
        };

        let parts = ConnectionParts {
            scheme: "redis",
            host,
            port: env_or("REDIS_PORT", 6379),
            user: None,
            password: env::var("REDIS_PASSWORD").ok().filter(|p| !p.is_empty()),
            path: env::var("REDIS_DB").unwrap_or_else(|_| "0".to_string()),
        };

        parts.to_url().map(Some)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!("Unknown LOG_FORMAT '{}' (expected text or json)", self.log_format);
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!("LISTEN needs a port, got '{}'", self.listen_addr);
        }

        let db_scheme = scheme_of(&self.database_url);
        if !matches!(db_scheme.as_deref(), Some("postgres" | "postgresql")) {
            anyhow::bail!(
                "DATABASE_URL must use the postgres:// or postgresql:// scheme, got '{}'",
                mask_connection_string(&self.database_url)
            );
        }

        if let Some(redis_url) = &self.redis_url
            && !matches!(scheme_of(redis_url).as_deref(), Some("redis" | "rediss"))
        {
            anyhow::bail!(
                "REDIS_URL must use the redis:// or rediss:// scheme, got '{}'",
                mask_connection_string(redis_url)
            );
        }

        if self.brand_host.is_empty() {
            anyhow::bail!("APP_DOMAIN must not be empty");
        }

        if !self.short_path_prefix.starts_with('/') || self.short_path_prefix.len() < 2 {
            anyhow::bail!(
                "SHORT_URL_PATH must start with '/' and name a segment, got '{}'",
                self.short_path_prefix
            );
        }

        if self.max_url_length < 3 {
            anyhow::bail!(
                "MAX_URL_LENGTH must be at least 3, got {}",
                self.max_url_length
            );
        }

        if !(4..=32).contains(&self.short_id_length) {
            anyhow::bail!(
                "SHORT_URL_LENGTH must be between 4 and 32, got {}",
                self.short_id_length
            );
        }

        if self.max_body_bytes == 0 {
            anyhow::bail!("MAX_BODY_BYTES must be greater than 0");
        }

        if self.rate_limit_requests == 0 {
            anyhow::bail!("RATE_LIMIT_REQUESTS must be greater than 0");
        }
        if self.rate_limit_window_ms == 0 {
            anyhow::bail!("RATE_LIMIT_WINDOW_MS must be greater than 0");
        }

        if self.interstitial_threshold < 0 {
            anyhow::bail!(
                "REDIRECT_PAGE_SHOW_ONLY_AFTER_X_ACCESSES must not be negative, got {}",
                self.interstitial_threshold
            );
        }

        if self.analytics_queue_capacity < 100 {
            anyhow::bail!(
                "ANALYTICS_QUEUE_CAPACITY must be at least 100, got {}",
                self.analytics_queue_capacity
            );
        }
        if self.analytics_queue_capacity > 1_000_000 {
            anyhow::bail!(
                "ANALYTICS_QUEUE_CAPACITY is too large (max: 1000000), got {}",
                self.analytics_queue_capacity
            );
        }

        if self.db_max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be positive");
        }
        if self.db_connect_timeout == 0 {
            anyhow::bail!("DB_CONNECT_TIMEOUT must be positive");
        }

        Ok(())
    }

    /// Composes the public short URL for a short id.
    pub fn short_url(&self, short_id: &str) -> String {
        format!(
            "{}{}/{}",
            self.brand_url.trim_end_matches('/'),
            self.short_path_prefix,
            short_id
        )
    }

    /// Logs the effective settings with credentials masked.
    pub fn print_summary(&self) {
        tracing::info!("Configuration:");
        tracing::info!("  Listen: {}", self.listen_addr);
        tracing::info!("  Brand: {} ({})", self.brand_url, self.brand_host);
        tracing::info!("  Postgres: {}", mask_connection_string(&self.database_url));

        if let Some(ref redis_url) = self.redis_url {
            tracing::info!(
                "  Rate limit store: {} (enabled)",
                mask_connection_string(redis_url)
            );
        } else {
            tracing::info!("  Rate limit store: disabled (fail-open)");
        }

        tracing::info!(
            "  Rate limit: {} requests / {} ms",
            self.rate_limit_requests,
            self.rate_limit_window_ms
        );
        tracing::info!(
            "  Interstitial: enabled={} after {} accesses, {}s timer",
            self.interstitial_enabled,
            self.interstitial_threshold,
            self.interstitial_timer_seconds
        );
        tracing::info!("  Analytics: enabled={}", self.analytics_enabled);
        tracing::info!("  Logging: {} ({})", self.log_level, self.log_format);
    }
}

/// Extracts the lowercased host from an absolute URL.
fn host_of(raw: &str) -> Option<String> {
    url::Url::parse(raw)
        .ok()?
        .host_str()
        .map(|h| h.to_ascii_lowercase())
}

/// Connection URL pieces read from split environment variables.
struct ConnectionParts {
    scheme: &'static str,
    host: String,
    port: u16,
    user: Option<String>,
    password: Option<String>,
    path: String,
}

impl ConnectionParts {
    /// Builds the URL, percent-encoding credentials.
    fn to_url(&self) -> Result<String> {
        let mut url = url::Url::parse(&format!("{}://{}", self.scheme, self.host))
            .with_context(|| format!("Invalid {} host '{}'", self.scheme, self.host))?;

        let invalid = || anyhow::anyhow!("Cannot set credentials on {} URL", self.scheme);
        url.set_port(Some(self.port)).map_err(|_| invalid())?;
        if let Some(user) = &self.user {
            url.set_username(user).map_err(|_| invalid())?;
        }
        if let Some(password) = &self.password {
            url.set_password(Some(password)).map_err(|_| invalid())?;
        }
        url.set_path(&format!("/{}", self.path));

        Ok(url.to_string())
    }
}

fn scheme_of(raw: &str) -> Option<String> {
    url::Url::parse(raw).ok().map(|u| u.scheme().to_string())
}

/// Replaces the password of a connection URL with `***` for logging.
///
/// Unparsable input is returned as a placeholder so it never leaks.
fn mask_connection_string(raw: &str) -> String {
    let Ok(mut url) = url::Url::parse(raw) else {
        return "<unparsable>".to_string();
    };

    if url.password().is_some() && url.set_password(Some("***")).is_err() {
        return "<unparsable>".to_string();
    }

    url.to_string()
}

/// [`Config::from_env`] followed by [`Config::validate`].
///
/// `.env` must already be loaded; `main` does that with `dotenvy`.
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
