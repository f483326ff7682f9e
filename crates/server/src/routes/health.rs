use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: DateTime<Utc>,
    version: String,
    database: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Health check", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match db::ping(&state.pool).await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "Database ping failed");
            "disconnected"
        }
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    })
}

#[derive(Serialize, ToSchema)]
pub struct DbStatusResponse {
    status: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_deployments: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/db-status",
    responses(
        (status = 200, description = "Database is ready", body = DbStatusResponse),
        (status = 503, description = "Database unavailable", body = DbStatusResponse)
    ),
    tag = "health"
)]
pub async fn db_status(State(state): State<AppState>) -> (StatusCode, Json<DbStatusResponse>) {
    match state.deployments.count().await {
        Ok(count) => (
            StatusCode::OK,
            Json(DbStatusResponse {
                status: "ready".to_string(),
                message: "Database is ready".to_string(),
                total_deployments: Some(count),
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Database status query failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(DbStatusResponse {
                    status: "error".to_string(),
                    message: "Database query failed".to_string(),
                    total_deployments: None,
                }),
            )
        }
    }
}
