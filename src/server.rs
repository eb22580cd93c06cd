//! HTTP server initialization and runtime setup.
//!
//! Composition root: owns the database pool, the rate limit store and the
//! analytics worker for the lifetime of the process.

use crate::config::Config;
use crate::domain::analytics_worker::{AnalyticsDispatcher, run_analytics_worker};
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::persistence::{PgAnalyticsSink, PgLinkRepository};
use crate::infrastructure::rate_limit::{NullRateLimitStore, RateLimitStore, RedisRateLimitStore};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Redis rate limit store (or NullRateLimitStore when not configured)
/// - Background analytics worker (when enabled)
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migrations fail
/// - A configured Redis cannot be reached
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let config = Arc::new(config);

    let pool = connect_database(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Migrations applied");

    let rate_limiter: Arc<dyn RateLimitStore> = match &config.redis_url {
        Some(redis_url) => {
            let store = RedisRateLimitStore::connect(
                redis_url,
                config.rate_limit_requests,
                config.rate_limit_window_ms,
            )
            .await
            .context("Rate limit store is configured but unreachable")?;
            tracing::info!("Rate limiting enabled (Redis)");
            Arc::new(store)
        }
        None => {
            tracing::warn!("REDIS_URL not set, rate limiting disabled (fail-open)");
            Arc::new(NullRateLimitStore::new(
                config.rate_limit_requests,
                config.rate_limit_window_ms,
            ))
        }
    };

    let pool_arc = Arc::new(pool.clone());

    let (analytics, worker) = if config.analytics_enabled {
        let (dispatcher, rx) = AnalyticsDispatcher::channel(config.analytics_queue_capacity);
        let sink = Arc::new(PgAnalyticsSink::new(pool_arc.clone()));
        let handle = tokio::spawn(run_analytics_worker(rx, sink));
        (dispatcher, Some(handle))
    } else {
        tracing::info!("Analytics disabled");
        (AnalyticsDispatcher::disabled(), None)
    };

    let link_repository: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(pool_arc));

    let state = AppState::new(config.clone(), link_repository, rate_limiter, analytics);

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router (and with it every dispatcher clone) is gone, so the worker
    // drains what is queued and exits.
    if let Some(worker) = worker
        && let Err(e) = worker.await
    {
        tracing::error!("Analytics worker terminated abnormally: {e}");
    }

    pool.close().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn connect_database(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        },
    }
}
