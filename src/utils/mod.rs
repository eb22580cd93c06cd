//! Request screening helpers used across the application.
//!
//! - [`url_validator`] - Destination URL screening and normalization
//! - [`blocklist`] - Static domain/keyword/TLD denylist
//! - [`slug_validator`] - Custom short id validation
//! - [`short_id`] - Short id generation and sanitization
//! - [`client_ip`] - Client key derivation from proxy headers
//! - [`origin`] - Same-origin checks

pub mod blocklist;
pub mod client_ip;
pub mod origin;
pub mod short_id;
pub mod slug_validator;
pub mod url_validator;
