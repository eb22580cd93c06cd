//! ShortLink entity representing one short id → destination mapping.

use chrono::{DateTime, Utc};

/// A persisted short link with its visit counters.
///
/// `clicks` and `accesses` only ever grow. `accesses` counts every resolution
/// attempt; `clicks` counts visitors that actually went on to the destination.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ShortLink {
    pub short_id: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub clicks: i64,
    pub accesses: i64,
}

impl ShortLink {
    /// Creates a new ShortLink instance.
    pub fn new(
        short_id: String,
        original_url: String,
        created_at: DateTime<Utc>,
        clicks: i64,
        accesses: i64,
    ) -> Self {
        Self {
            short_id,
            original_url,
            created_at,
            clicks,
            accesses,
        }
    }

    /// Access count before the resolution that produced this record.
    pub fn previous_accesses(&self) -> i64 {
        (self.accesses - 1).max(0)
    }
}

/// Input data for creating a new short link.
///
/// Counters always start at zero and `created_at` is set by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortLink {
    pub short_id: String,
    pub original_url: String,
}
