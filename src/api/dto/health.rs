//! Health probe DTOs.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

/// Aggregate health report.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "status": "healthy",
    "version": "0.1.0",
    "timestamp": "2025-06-01T12:00:00Z",
    "checks": {
        "database": {
            "status": "healthy",
            "message": "Connected",
            "response_time_ms": 3
        }
    }
}))]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    /// RFC 3339 timestamp of the check
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: String,
    /// Per-dependency results keyed by component name
    pub checks: BTreeMap<String, ComponentHealth>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    pub message: Option<String>,
    pub response_time_ms: Option<u64>,
}

impl HealthResponse {
    /// Overall status is unhealthy when any component is.
    pub fn from_checks(version: &str, checks: BTreeMap<String, ComponentHealth>) -> Self {
        let status = if checks
            .values()
            .any(|check| check.status == HealthStatus::Unhealthy)
        {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Healthy
        };

        Self {
            status,
            version: version.to_string(),
            timestamp: jiff::Timestamp::now().to_string(),
            checks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(status: HealthStatus) -> ComponentHealth {
        ComponentHealth {
            status,
            message: None,
            response_time_ms: Some(1),
        }
    }

    #[test]
    fn test_health_status_serialization() {
        let json = serde_json::to_string(&HealthStatus::Unhealthy).unwrap();
        assert_eq!(json, "\"unhealthy\"");
    }

    #[test]
    fn test_any_unhealthy_component_fails_overall() {
        let mut checks = BTreeMap::new();
        checks.insert("database".to_string(), component(HealthStatus::Unhealthy));
        checks.insert("cache".to_string(), component(HealthStatus::Healthy));

        let response = HealthResponse::from_checks("0.1.0", checks);
        assert_eq!(response.status, HealthStatus::Unhealthy);
    }

    #[test]
    fn test_no_checks_is_healthy() {
        let response = HealthResponse::from_checks("0.1.0", BTreeMap::new());
        assert_eq!(response.status, HealthStatus::Healthy);
        assert_eq!(response.version, "0.1.0");
    }
}
