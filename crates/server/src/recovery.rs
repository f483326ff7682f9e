use db::{DeploymentLogRepository, DeploymentRepository, DbError};
use launchpad_core::{LogStep, NewLogEntry};
use tracing::{info, warn};
use uuid::Uuid;

pub const INTERRUPTED_MESSAGE: &str = "Interrupted by server restart";

/// Fails every deployment a previous process left mid-flight. Their key
/// material only ever lived in that process, so they cannot be resumed.
pub async fn recover_interrupted(
    deployments: &DeploymentRepository,
    logs: &DeploymentLogRepository,
) -> Result<Vec<Uuid>, DbError> {
    let interrupted = deployments.fail_interrupted(INTERRUPTED_MESSAGE).await?;

    for id in &interrupted {
        let entry = NewLogEntry::new(LogStep::Failed).with_error(INTERRUPTED_MESSAGE);
        if let Err(e) = logs.append(*id, &entry).await {
            warn!(deployment_id = %id, error = %e, "Failed to log interrupted deployment");
        }
    }

    if !interrupted.is_empty() {
        info!(count = interrupted.len(), "Marked interrupted deployments as failed");
    }
    Ok(interrupted)
}
