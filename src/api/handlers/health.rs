//! Health check endpoint handlers.
//!
//! Probes for load balancers and orchestrators. Readiness goes through the
//! store's `ping` so the same check works for any store implementation.

use std::collections::BTreeMap;
use std::time::Instant;

use axum::{Json, extract::State, http::StatusCode};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::{ApiResponse, ComponentHealth, HealthResponse, HealthStatus};
use crate::state::AppState;

/// Creates health check routes.
///
/// - `GET /health` - Full report
/// - `GET /health/ready` - Readiness probe
/// - `GET /health/live` - Liveness probe
pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health_check))
        .routes(routes!(readiness_check))
        .routes(routes!(liveness_check))
}

/// Enveloped health report with the probe status code.
type HealthReply = (StatusCode, Json<ApiResponse<HealthResponse>>);

/// Full health report including database connectivity.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = ApiResponse<HealthResponse>),
        (status = 503, description = "Service is unhealthy", body = ApiResponse<HealthResponse>)
    ),
    tag = HEALTH_TAG
)]
pub async fn health_check(State(state): State<AppState>) -> HealthReply {
    let mut checks = BTreeMap::new();
    checks.insert("database".to_string(), check_database(&state).await);
    reply(HealthResponse::from_checks(crate::pkg_version(), checks))
}

/// Readiness probe: ready once the store answers.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Service is ready", body = ApiResponse<HealthResponse>),
        (status = 503, description = "Service is not ready", body = ApiResponse<HealthResponse>)
    ),
    tag = HEALTH_TAG
)]
pub async fn readiness_check(State(state): State<AppState>) -> HealthReply {
    health_check(State(state)).await
}

/// Liveness probe; no dependency checks.
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Service is alive", body = ApiResponse<HealthResponse>)
    ),
    tag = HEALTH_TAG
)]
pub async fn liveness_check() -> HealthReply {
    reply(HealthResponse::from_checks(
        crate::pkg_version(),
        BTreeMap::new(),
    ))
}

fn reply(report: HealthResponse) -> HealthReply {
    let status = match report.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(ApiResponse::success(report)))
}

async fn check_database(state: &AppState) -> ComponentHealth {
    let start_time = Instant::now();
    let result = state.store.ping().await;
    let response_time_ms = Some(start_time.elapsed().as_millis() as u64);

    match result {
        Ok(()) => ComponentHealth {
            status: HealthStatus::Healthy,
            message: Some("Connected".to_string()),
            response_time_ms,
        },
        Err(e) => {
            tracing::warn!(error = ?e, "Database health check failed");
            ComponentHealth {
                status: HealthStatus::Unhealthy,
                message: Some("Database unavailable".to_string()),
                response_time_ms,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness_check() {
        let (status, Json(body)) = liveness_check().await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
        assert!(body.error.is_none());
        let report = body.data.unwrap();
        assert_eq!(report.status, HealthStatus::Healthy);
        assert!(report.checks.is_empty());
    }

    #[test]
    fn test_unhealthy_report_keeps_envelope_with_503() {
        let mut checks = BTreeMap::new();
        checks.insert(
            "database".to_string(),
            ComponentHealth {
                status: HealthStatus::Unhealthy,
                message: Some("Database unavailable".to_string()),
                response_time_ms: Some(1),
            },
        );

        let (status, Json(body)) = reply(HealthResponse::from_checks("0.1.0", checks));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.success);
        assert_eq!(body.data.unwrap().status, HealthStatus::Unhealthy);
    }
}
