use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use events::Event;
use launchpad_core::{
    validate_submission, CreateDeploymentRequest, Deployment, DeploymentLogEntry,
    DeploymentStatus, StatusUpdate,
};
use orchestrator::DeploymentJob;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

const ESTIMATED_TIME: &str = "3-6 minutes";

const COMPLETED_NEXT_STEPS: [&str; 3] = [
    "Access your blockchain via the RPC endpoint",
    "Use the API endpoint for queries",
    "Start building your application",
];

const FAILED_NEXT_STEPS: [&str; 3] = [
    "Check the error message above",
    "Verify VPS access and SSH key",
    "Try deploying again with a different chain name",
];

#[derive(Debug, Serialize, ToSchema)]
pub struct DeployResponse {
    pub deployment_id: Uuid,
    pub status: DeploymentStatus,
    pub message: String,
    pub estimated_time: String,
    pub status_endpoint: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/deploy",
    request_body = CreateDeploymentRequest,
    responses(
        (status = 202, description = "Deployment accepted", body = DeployResponse),
        (status = 400, description = "Validation failed", body = crate::error::ErrorResponse),
        (status = 409, description = "Chain name in use", body = crate::error::ErrorResponse)
    ),
    tag = "deployments"
)]
pub async fn create_deployment(
    State(state): State<AppState>,
    payload: Result<Json<CreateDeploymentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DeployResponse>), AppError> {
    let Json(request) = payload?;
    let submission = validate_submission(&request)?;

    let created = state
        .deployments
        .create(&Deployment::new(&submission))
        .await?;

    info!(
        deployment_id = %created.id,
        chain_name = %created.chain_name,
        host = %created.host,
        "Deployment queued"
    );
    state.event_bus.emit(Event::DeploymentCreated {
        deployment_id: created.id,
        chain_name: created.chain_name.clone(),
    });

    state
        .launcher
        .launch(DeploymentJob::new(&created, submission.ssh_key));

    Ok((
        StatusCode::ACCEPTED,
        Json(DeployResponse {
            deployment_id: created.id,
            status: created.status,
            message: "Deployment started successfully".to_string(),
            estimated_time: ESTIMATED_TIME.to_string(),
            status_endpoint: format!("/api/v1/deployments/{}/status", created.id),
        }),
    ))
}

/// What a caller polls. Which optional fields are present depends on the
/// status.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeploymentStatusResponse {
    pub deployment_id: Uuid,
    pub chain_name: String,
    pub status: DeploymentStatus,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_remaining: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_steps: Option<Vec<String>>,
}

impl From<Deployment> for DeploymentStatusResponse {
    fn from(deployment: Deployment) -> Self {
        let status = deployment.status;
        let mut response = Self {
            deployment_id: deployment.id,
            chain_name: deployment.chain_name,
            status,
            message: status.progress_hint().to_string(),
            created_at: deployment.created_at,
            updated_at: deployment.updated_at,
            rpc_endpoint: None,
            api_endpoint: None,
            error_message: None,
            estimated_remaining: None,
            next_steps: None,
        };

        match status {
            DeploymentStatus::Completed => {
                response.rpc_endpoint = deployment.rpc_endpoint;
                response.api_endpoint = deployment.api_endpoint;
                response.next_steps = Some(to_strings(&COMPLETED_NEXT_STEPS));
            }
            DeploymentStatus::Failed => {
                response.error_message = deployment.error_message;
                response.next_steps = Some(to_strings(&FAILED_NEXT_STEPS));
            }
            _ => {
                // The message column holds the latest progress note.
                if let Some(note) = deployment.error_message {
                    response.message = note;
                }
                response.estimated_remaining = status.estimated_remaining().map(str::to_string);
            }
        }

        response
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[utoipa::path(
    get,
    path = "/api/v1/deployments/{id}/status",
    params(("id" = Uuid, Path, description = "Deployment ID")),
    responses(
        (status = 200, description = "Current deployment status", body = DeploymentStatusResponse),
        (status = 404, description = "Deployment not found", body = crate::error::ErrorResponse)
    ),
    tag = "deployments"
)]
pub async fn get_deployment_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeploymentStatusResponse>, AppError> {
    let deployment = state.deployments.get(id).await?;
    Ok(Json(deployment.into()))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeploymentLogsResponse {
    pub deployment_id: Uuid,
    pub logs: Vec<DeploymentLogEntry>,
}

#[utoipa::path(
    get,
    path = "/api/v1/deployments/{id}/logs",
    params(("id" = Uuid, Path, description = "Deployment ID")),
    responses(
        (status = 200, description = "Log entries in write order", body = DeploymentLogsResponse),
        (status = 404, description = "Deployment not found", body = crate::error::ErrorResponse)
    ),
    tag = "deployments"
)]
pub async fn get_deployment_logs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeploymentLogsResponse>, AppError> {
    state.deployments.get(id).await?;
    let logs = state.logs.find_by_deployment_id(id).await?;
    Ok(Json(DeploymentLogsResponse {
        deployment_id: id,
        logs,
    }))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CancelResponse {
    pub deployment_id: Uuid,
    pub status: DeploymentStatus,
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/deployments/{id}/cancel",
    params(("id" = Uuid, Path, description = "Deployment ID")),
    responses(
        (status = 202, description = "Cancellation requested", body = CancelResponse),
        (status = 404, description = "Deployment not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Deployment already finished", body = crate::error::ErrorResponse)
    ),
    tag = "deployments"
)]
pub async fn cancel_deployment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<CancelResponse>), AppError> {
    let deployment = state.deployments.get(id).await?;
    if deployment.status.is_terminal() {
        return Err(AppError::Conflict(format!(
            "Deployment {} is already {}",
            id, deployment.status
        )));
    }

    let mut status = deployment.status;
    if !state.launcher.cancel(id) {
        // Nothing is running this record any more, so settle it here.
        warn!(deployment_id = %id, status = %status, "No running task for cancelled deployment");
        let change = state
            .deployments
            .update_status(id, &StatusUpdate::failed("Deployment cancelled"))
            .await?;
        status = change.deployment.status;
        state.event_bus.emit(Event::DeploymentStatusChanged {
            deployment_id: id,
            from: change.from,
            to: status,
            message: change.deployment.error_message,
        });
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(CancelResponse {
            deployment_id: id,
            status,
            message: "Cancellation requested".to_string(),
        }),
    ))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListQuery {
    /// Limit falls back to the default when missing or not positive, and
    /// is capped at [`MAX_PAGE_SIZE`].
    pub fn page(&self) -> (i64, i64) {
        let limit = match self.limit {
            Some(limit) if limit > 0 => limit.min(MAX_PAGE_SIZE),
            _ => DEFAULT_PAGE_SIZE,
        };
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeploymentSummary {
    pub id: Uuid,
    pub chain_name: String,
    pub vps_ip: String,
    pub status: DeploymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Deployment> for DeploymentSummary {
    fn from(deployment: Deployment) -> Self {
        Self {
            id: deployment.id,
            chain_name: deployment.chain_name,
            vps_ip: deployment.host,
            status: deployment.status,
            created_at: deployment.created_at,
            updated_at: deployment.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeploymentListResponse {
    pub deployments: Vec<DeploymentSummary>,
    pub pagination: Pagination,
}

#[utoipa::path(
    get,
    path = "/api/v1/deployments",
    params(ListQuery),
    responses(
        (status = 200, description = "Most recent deployments first", body = DeploymentListResponse)
    ),
    tag = "deployments"
)]
pub async fn list_deployments(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<DeploymentListResponse>, AppError> {
    let (limit, offset) = query.page();
    let deployments = state.deployments.list(limit, offset).await?;
    let total = state.deployments.count().await?;

    Ok(Json(DeploymentListResponse {
        deployments: deployments.into_iter().map(Into::into).collect(),
        pagination: Pagination {
            total,
            limit,
            offset,
            has_more: offset + limit < total,
        },
    }))
}
