use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

pub const SERVICE_NAME: &str = "imobicontract-backend";
pub const BANNER: &str = "🚀 ImobiContract Backend Online!";

#[derive(Clone)]
pub struct HealthState {
    pub db: DatabaseConnection,
    pub started_at: Arc<Instant>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `ok` or `degraded`
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    /// Seconds since startup
    pub uptime: u64,
    pub database: DatabaseHealth,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHealth {
    pub status: &'static str,
    pub latency_ms: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses((status = 200, description = "Banner", body = String))
)]
pub async fn banner() -> &'static str {
    BANNER
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let ping_started = Instant::now();
    let ping = state
        .db
        .execute(Statement::from_string(
            state.db.get_database_backend(),
            "SELECT 1".to_string(),
        ))
        .await;

    let (status, database) = match ping {
        Ok(_) => (
            StatusCode::OK,
            DatabaseHealth {
                status: "ok",
                latency_ms: Some(ping_started.elapsed().as_millis() as u64),
            },
        ),
        Err(err) => {
            warn!(error = %err, "Database ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                DatabaseHealth {
                    status: "error",
                    latency_ms: None,
                },
            )
        }
    };

    (
        status,
        Json(HealthResponse {
            status: if status == StatusCode::OK { "ok" } else { "degraded" },
            service: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
            uptime: state.started_at.elapsed().as_secs(),
            database,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::testing::setup_db;

    #[tokio::test]
    async fn reports_ok_with_live_database() {
        let db = setup_db().await;
        let state = HealthState {
            db,
            started_at: Arc::new(Instant::now()),
        };
        let (status, Json(body)) = health_check(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.service, "imobicontract-backend");
        assert_eq!(body.database.status, "ok");
    }

    #[tokio::test]
    async fn reports_degraded_when_database_is_closed() {
        let db = setup_db().await;
        let state = HealthState {
            db: db.clone(),
            started_at: Arc::new(Instant::now()),
        };
        db.close().await.unwrap();
        let (status, Json(body)) = health_check(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");
    }
}
