use linkgate::domain::analytics::{AnalyticsEvent, AnalyticsEventType, AnalyticsSink};
use linkgate::infrastructure::persistence::PgAnalyticsSink;
use sqlx::PgPool;
use std::sync::Arc;

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_record_stores_columns_and_payload(pool: PgPool) {
    let sink = PgAnalyticsSink::new(Arc::new(pool.clone()));

    let event = AnalyticsEvent::link_created("abc123", "https://example.com/", true)
        .with_ip_address("203.0.113.5");
    sink.record(&event).await.unwrap();

    type Row = (String, Option<String>, Option<bool>, Option<String>);
    let (event_type, short_id, custom_alias, ip): Row =
        sqlx::query_as("SELECT event_type, short_id, custom_alias, ip_address FROM analytics_events")
            .fetch_one(&pool)
            .await
            .unwrap();

    assert_eq!(event_type, "link_created");
    assert_eq!(short_id.as_deref(), Some("abc123"));
    assert_eq!(custom_alias, Some(true));
    assert_eq!(ip.as_deref(), Some("203.0.113.5"));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_record_accepts_maximum_width_values(pool: PgPool) {
    let sink = PgAnalyticsSink::new(Arc::new(pool.clone()));

    // Widest values the ingestion endpoint lets through, plus an oversized
    // client address header.
    let event = AnalyticsEvent::new(AnalyticsEventType::AdClicked)
        .with_short_id("s".repeat(64))
        .with_url(format!("https://example.com/{}", "p".repeat(2028)))
        .with_referrer("r".repeat(2048))
        .with_error_message("e".repeat(1024))
        .with_ip_address(format!("{}, 10.0.0.1", "2001:db8::1".repeat(40)));

    sink.record(&event).await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM analytics_events")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}
