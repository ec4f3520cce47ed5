//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use persistence::repositories::CourseNotificationRepository;

use crate::app::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: DatabaseHealth,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_services: Option<ExternalServicesHealth>,
}

/// Database health status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseHealth {
    pub connected: bool,
    pub latency_ms: Option<u64>,
}

/// External services health status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ExternalServicesHealth {
    pub live_updates: LiveUpdatesHealth,
    pub mail_worker: MailWorkerHealth,
}

/// Live-update delivery status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LiveUpdatesHealth {
    /// Whether a live-update server is configured.
    pub enabled: bool,
    /// Notifications still waiting for delivery.
    pub pending_notifications: i64,
}

/// Mail worker status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MailWorkerHealth {
    /// Whether the worker is pinged after emails are queued.
    pub ping_enabled: bool,
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Full health check endpoint.
///
/// Returns database connectivity and the state of the outbox and mail worker.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    let start = std::time::Instant::now();
    let db_connected = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();
    let latency_ms = start.elapsed().as_millis() as u64;

    if !db_connected {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    let live_updates = &state.config.live_updates;
    let pending_notifications = CourseNotificationRepository::new(state.pool.clone())
        .count_pending(live_updates.max_attempts)
        .await
        .unwrap_or_default();

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: DatabaseHealth {
            connected: true,
            latency_ms: Some(latency_ms),
        },
        external_services: Some(ExternalServicesHealth {
            live_updates: LiveUpdatesHealth {
                enabled: !live_updates.url.trim().is_empty(),
                pending_notifications,
            },
            mail_worker: MailWorkerHealth {
                ping_enabled: state.email_worker.is_enabled(),
            },
        }),
    }))
}

/// Liveness probe endpoint.
///
/// Returns 200 OK if the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint.
///
/// Returns 200 OK if the service can accept traffic (database connected).
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    let db_connected = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();

    if db_connected {
        Ok(Json(StatusResponse {
            status: "ready".to_string(),
        }))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            database: DatabaseHealth {
                connected: true,
                latency_ms: Some(5),
            },
            external_services: Some(ExternalServicesHealth {
                live_updates: LiveUpdatesHealth {
                    enabled: true,
                    pending_notifications: 3,
                },
                mail_worker: MailWorkerHealth {
                    ping_enabled: false,
                },
            }),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["database"]["latency_ms"], 5);
        assert_eq!(
            json["external_services"]["live_updates"]["pending_notifications"],
            3
        );
        assert_eq!(json["external_services"]["mail_worker"]["ping_enabled"], false);
    }

    #[test]
    fn test_external_services_omitted_when_absent() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            database: DatabaseHealth {
                connected: true,
                latency_ms: None,
            },
            external_services: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("external_services"));
    }

    #[tokio::test]
    async fn test_live() {
        let Json(response) = live().await;
        assert_eq!(response.status, "alive");
    }
}
