//! Core domain entities.
//!
//! - [`ShortLink`] - A persisted short id mapping with visit counters
//! - [`NewShortLink`] - Input for creating a short link

pub mod short_link;

pub use short_link::{NewShortLink, ShortLink};
