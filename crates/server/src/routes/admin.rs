use axum::extract::State;
use axum::Json;
use launchpad_core::DeploymentStats;

use crate::error::AppError;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/admin/stats",
    responses(
        (status = 200, description = "Aggregate deployment counters", body = DeploymentStats)
    ),
    tag = "admin"
)]
pub async fn admin_stats(State(state): State<AppState>) -> Result<Json<DeploymentStats>, AppError> {
    let stats = state.deployments.stats().await?;
    Ok(Json(stats))
}
