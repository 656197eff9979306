use crate::config::database::{Database, DatabaseTrait};
use crate::config::logging::secure_log;
use crate::response::app_response::SuccessResponse;
use crate::state::health_state::HealthState;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub storage: StorageHealth,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StorageHealth {
    pub backend: String,
    pub status: String,
    pub response_time_ms: Option<u128>,
    pub error: Option<String>,
}

pub async fn health_check(State(state): State<HealthState>) -> SuccessResponse<HealthStatus> {
    let storage = match &state.database {
        Some(db) => check_database_health(db).await,
        None => StorageHealth {
            backend: "memory".to_string(),
            status: "healthy".to_string(),
            response_time_ms: None,
            error: None,
        },
    };

    let healthy = storage.status == "healthy";
    let report = HealthStatus {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage,
    };

    let response = SuccessResponse::send("Service health report", report);
    if healthy {
        response
    } else {
        response.with_status(StatusCode::SERVICE_UNAVAILABLE)
    }
}

async fn check_database_health(db: &Database) -> StorageHealth {
    let start_time = Instant::now();

    match sqlx::query("SELECT 1").execute(db.get_pool()).await {
        Ok(_) => {
            let response_time = start_time.elapsed().as_millis();
            info!("Database health check passed in {}ms", response_time);
            StorageHealth {
                backend: "postgres".to_string(),
                status: "healthy".to_string(),
                response_time_ms: Some(response_time),
                error: None,
            }
        }
        Err(e) => {
            secure_log::secure_error!("Database health check failed", e);
            StorageHealth {
                backend: "postgres".to_string(),
                status: "unhealthy".to_string(),
                response_time_ms: None,
                error: Some("Database is unreachable".to_string()),
            }
        }
    }
}
