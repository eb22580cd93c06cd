use linkgate::domain::entities::NewShortLink;
use linkgate::domain::repositories::LinkRepository;
use linkgate::error::AppError;
use linkgate::infrastructure::persistence::PgLinkRepository;
use sqlx::PgPool;
use std::sync::Arc;

fn new_link(short_id: &str) -> NewShortLink {
    NewShortLink {
        short_id: short_id.to_string(),
        original_url: "https://example.com/".to_string(),
    }
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_create_link(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    let link = repo.create(new_link("test123")).await.unwrap();

    assert_eq!(link.short_id, "test123");
    assert_eq!(link.original_url, "https://example.com/");
    assert_eq!(link.clicks, 0);
    assert_eq!(link.accesses, 0);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_create_duplicate_is_conflict(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    repo.create(new_link("dup001")).await.unwrap();
    let err = repo.create(new_link("dup001")).await.unwrap_err();

    assert!(matches!(err, AppError::Conflict { .. }));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_find_by_short_id(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));
    repo.create(new_link("abc123")).await.unwrap();

    assert!(repo.find_by_short_id("abc123").await.unwrap().is_some());
    assert!(repo.find_by_short_id("ABC123").await.unwrap().is_none());
    assert!(repo.find_by_short_id("missing").await.unwrap().is_none());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_counters_increment_atomically(pool: PgPool) {
    let repo = Arc::new(PgLinkRepository::new(Arc::new(pool)));
    repo.create(new_link("busy01")).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            repo.increment_accesses("busy01").await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let link = repo.increment_clicks("busy01").await.unwrap().unwrap();
    assert_eq!(link.accesses, 20);
    assert_eq!(link.clicks, 1);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_increment_missing_returns_none(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    assert!(repo.increment_accesses("nothere").await.unwrap().is_none());
    assert!(repo.increment_clicks("nothere").await.unwrap().is_none());
    assert!(repo.health_check().await.is_ok());
}
