//! Short id generation and sanitization.
//!
//! Generated ids are drawn uniformly from the 62-symbol alphanumeric alphabet
//! using the thread-local CSPRNG. Uniqueness is the caller's concern.

use rand::Rng;
use rand::distr::Alphanumeric;

/// Length of generated short ids unless configured otherwise.
pub const DEFAULT_SHORT_ID_LENGTH: usize = 6;

/// Generates a random alphanumeric short id of [`DEFAULT_SHORT_ID_LENGTH`] characters.
pub fn generate_short_id() -> String {
    generate_short_id_with_length(DEFAULT_SHORT_ID_LENGTH)
}

/// Generates a random alphanumeric short id of `length` characters.
pub fn generate_short_id_with_length(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Removes every character that is not an ASCII letter or digit.
pub fn sanitize_short_id(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Returns true when `raw` is safe to look up as a short id.
///
/// Accepts exactly what [`sanitize_short_id`] leaves untouched, plus the
/// single interior hyphens that custom slugs may contain.
pub fn is_resolvable_short_id(raw: &str) -> bool {
    if raw.is_empty() || raw.starts_with('-') || raw.ends_with('-') || raw.contains("--") {
        return false;
    }

    let without_hyphens: String = raw.chars().filter(|c| *c != '-').collect();
    !without_hyphens.is_empty() && sanitize_short_id(&without_hyphens) == without_hyphens
}
