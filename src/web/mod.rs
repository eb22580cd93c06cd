//! Server-rendered HTML for the redirect surface.
//!
//! Uses Askama templates from `templates/`.

pub mod templates;

pub use templates::{InterstitialTemplate, NotFoundTemplate};
