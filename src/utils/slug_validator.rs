//! Validation of user-supplied custom short ids.

use crate::error::AppError;

/// Shortest accepted custom slug.
pub const MIN_SLUG_LENGTH: usize = 3;
/// Longest accepted custom slug.
pub const MAX_SLUG_LENGTH: usize = 32;

/// Reasons a custom slug is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlugValidationError {
    #[error("Custom URL is required")]
    Empty,

    #[error("Custom URL must be between 3 and 32 characters")]
    InvalidLength,

    #[error("Custom URL can only contain letters, numbers, and hyphens")]
    InvalidCharacters,

    #[error("Custom URL cannot contain consecutive hyphens")]
    ConsecutiveHyphens,

    #[error("Custom URL cannot start or end with a hyphen")]
    EdgeHyphen,
}

impl From<SlugValidationError> for AppError {
    fn from(e: SlugValidationError) -> Self {
        AppError::bad_request(e.to_string())
    }
}

/// Validates a custom slug and returns its normalized (trimmed, lowercased) form.
///
/// # Rules
///
/// - Length: 3-32 characters after trimming
/// - Allowed characters: `a-z`, `0-9`, `-` (input is lowercased first)
/// - No consecutive hyphens
/// - Cannot start or end with a hyphen
///
/// # Errors
///
/// Returns the [`SlugValidationError`] for the first violated rule.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(validate_custom_slug("UPPER").unwrap(), "upper");
/// assert!(validate_custom_slug("-start").is_err());
/// ```
pub fn validate_custom_slug(input: &str) -> Result<String, SlugValidationError> {
    let slug = input.trim().to_lowercase();

    if slug.is_empty() {
        return Err(SlugValidationError::Empty);
    }

    let length = slug.chars().count();
    if !(MIN_SLUG_LENGTH..=MAX_SLUG_LENGTH).contains(&length) {
        return Err(SlugValidationError::InvalidLength);
    }

    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(SlugValidationError::InvalidCharacters);
    }

    if slug.contains("--") {
        return Err(SlugValidationError::ConsecutiveHyphens);
    }

    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(SlugValidationError::EdgeHyphen);
    }

    Ok(slug)
}
