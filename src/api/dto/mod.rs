//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization; ingestion
//! payloads are checked with `validator`.

pub mod analytics;
pub mod click;
pub mod health;
pub mod shorten;
