use launchpad_core::{DeploymentLogEntry, LogStep};
use uuid::Uuid;

use super::timestamp_to_datetime;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DeploymentLogRow {
    pub id: i64,
    pub deployment_id: String,
    pub step: String,
    pub command: Option<String>,
    pub output: Option<String>,
    pub error: Option<String>,
    pub created_at: i64,
}

impl DeploymentLogRow {
    pub fn into_domain(self) -> DeploymentLogEntry {
        DeploymentLogEntry {
            id: self.id,
            deployment_id: Uuid::parse_str(&self.deployment_id).unwrap_or_default(),
            step: LogStep::parse(&self.step).unwrap_or(LogStep::Failed),
            command: self.command,
            output: self.output,
            error: self.error,
            created_at: timestamp_to_datetime(self.created_at),
        }
    }
}
