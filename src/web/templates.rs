//! Server-rendered pages for the redirect surface.

use askama::Template;
use askama_web::WebTemplate;

use crate::config::Config;
use crate::domain::entities::ShortLink;

/// Countdown page shown before handing the visitor the destination.
///
/// Renders `templates/interstitial.html`. The page POSTs to `click_url` when
/// the visitor continues, then navigates to `destination`.
#[derive(Template, WebTemplate)]
#[template(path = "interstitial.html")]
pub struct InterstitialTemplate {
    pub brand_name: String,
    pub brand_url: String,
    pub destination: String,
    pub click_url: String,
    pub timer_seconds: u32,
    pub clicks: i64,
}

impl InterstitialTemplate {
    pub fn new(config: &Config, link: &ShortLink, timer_seconds: u32) -> Self {
        Self {
            brand_name: config.brand_name.clone(),
            brand_url: config.brand_url.clone(),
            destination: link.original_url.clone(),
            click_url: format!("/api/urls/{}/click", link.short_id),
            timer_seconds,
            clicks: link.clicks,
        }
    }
}

/// Error page for unknown or malformed short ids.
///
/// Renders `templates/not_found.html`.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub brand_name: String,
    pub brand_url: String,
    pub message: String,
    pub short_id: Option<String>,
}

impl NotFoundTemplate {
    /// Page for an identifier that failed sanitization.
    pub fn invalid(config: &Config) -> Self {
        Self {
            brand_name: config.brand_name.clone(),
            brand_url: config.brand_url.clone(),
            message: "Invalid link identifier.".to_string(),
            short_id: None,
        }
    }

    /// Page for a well-formed identifier with no stored link.
    pub fn missing(config: &Config, short_id: &str) -> Self {
        Self {
            brand_name: config.brand_name.clone(),
            brand_url: config.brand_url.clone(),
            message: "This short link does not exist.".to_string(),
            short_id: Some(short_id.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_interstitial_renders_destination_and_click_url() {
        let config = Config::default();
        let link = ShortLink::new(
            "abc123".to_string(),
            "https://example.com/?a=1&b=2".to_string(),
            Utc::now(),
            7,
            30,
        );

        let html = InterstitialTemplate::new(&config, &link, 15).render().unwrap();

        assert!(html.contains(r#"data-click-url="/api/urls/abc123/click""#));
        assert!(html.contains(r#"data-seconds="15""#));
        assert!(html.contains("https://example.com/?a=1&amp;b=2"));
        assert!(html.contains("clicked 7 times"));
    }

    #[test]
    fn test_not_found_variants() {
        let config = Config::default();

        let html = NotFoundTemplate::invalid(&config).render().unwrap();
        assert!(html.contains("Invalid link identifier."));
        assert!(!html.contains("No URL found"));

        let html = NotFoundTemplate::missing(&config, "gone42").render().unwrap();
        assert!(html.contains("No URL found for <code>gone42</code>"));
    }

    #[test]
    fn test_markup_in_destination_is_escaped() {
        let config = Config::default();
        let link = ShortLink::new(
            "x1y2z3".to_string(),
            "https://example.com/\"><script>alert(1)</script>".to_string(),
            Utc::now(),
            0,
            0,
        );

        let html = InterstitialTemplate::new(&config, &link, 15).render().unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
    }
}
