//! PostgreSQL analytics sink.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::analytics::{AnalyticsError, AnalyticsEvent, AnalyticsSink};

/// Appends analytics events to the `analytics_events` table.
///
/// The full event is also kept as JSON in `payload` for ad-hoc querying.
pub struct PgAnalyticsSink {
    pool: Arc<PgPool>,
}

impl PgAnalyticsSink {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalyticsSink for PgAnalyticsSink {
    async fn record(&self, event: &AnalyticsEvent) -> Result<(), AnalyticsError> {
        let payload = serde_json::to_value(event)
            .map_err(|e| AnalyticsError::Storage(format!("payload encoding failed: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO analytics_events
                (event_type, short_id, url, custom_alias, ip_address, referrer, error_message, payload, occurred_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(event.event_type.as_str())
        .bind(&event.short_id)
        .bind(&event.url)
        .bind(event.custom_alias)
        .bind(&event.ip_address)
        .bind(&event.referrer)
        .bind(&event.error_message)
        .bind(sqlx::types::Json(payload))
        .bind(event.timestamp)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}
