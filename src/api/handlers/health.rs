//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Database**: `SELECT 1`
/// 2. **Rate limit store**: Redis PING, or a note that limiting is disabled
/// 3. **Analytics queue**: Open and remaining capacity, or disabled
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let database = check_database(&state).await;
    let rate_limit_store = check_rate_limit_store(&state).await;
    let analytics_queue = check_analytics_queue(&state);

    let all_healthy = database.is_ok() && rate_limit_store.is_ok() && analytics_queue.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database,
            rate_limit_store,
            analytics_queue,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_database(state: &AppState) -> CheckStatus {
    match state.link_repository.health_check().await {
        Ok(()) => CheckStatus::ok("Connected"),
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            CheckStatus::error("Database unreachable")
        }
    }
}

async fn check_rate_limit_store(state: &AppState) -> CheckStatus {
    if !state.rate_limiter.is_configured() {
        return CheckStatus::ok("Disabled (fail-open)");
    }

    if state.rate_limiter.health_check().await {
        CheckStatus::ok("Redis connected")
    } else {
        CheckStatus::error("Redis connection failed")
    }
}

fn check_analytics_queue(state: &AppState) -> CheckStatus {
    match state.analytics.queue_capacity() {
        None => CheckStatus::ok("Disabled"),
        Some(_) if state.analytics.is_closed() => CheckStatus::error("Analytics queue is closed"),
        Some(capacity) => CheckStatus::ok(format!("Capacity: {capacity}")),
    }
}
