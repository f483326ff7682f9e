use chrono::{DateTime, Utc};
use launchpad_core::{DeploymentStatus, LogStep};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event: Event,
}

impl EventEnvelope {
    pub fn new(event: Event) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    #[serde(rename = "deployment.created")]
    DeploymentCreated {
        deployment_id: Uuid,
        chain_name: String,
    },

    #[serde(rename = "deployment.status_changed")]
    DeploymentStatusChanged {
        deployment_id: Uuid,
        from: DeploymentStatus,
        to: DeploymentStatus,
        message: Option<String>,
    },

    /// A note written without changing status.
    #[serde(rename = "deployment.progress")]
    DeploymentProgress {
        deployment_id: Uuid,
        status: DeploymentStatus,
        message: String,
    },

    #[serde(rename = "deployment.log_appended")]
    DeploymentLogAppended {
        deployment_id: Uuid,
        log_id: i64,
        step: LogStep,
    },
}

impl Event {
    pub fn deployment_id(&self) -> Uuid {
        match self {
            Event::DeploymentCreated { deployment_id, .. }
            | Event::DeploymentStatusChanged { deployment_id, .. }
            | Event::DeploymentProgress { deployment_id, .. }
            | Event::DeploymentLogAppended { deployment_id, .. } => *deployment_id,
        }
    }

    /// The status this event leaves the deployment in, when it says.
    pub fn status(&self) -> Option<DeploymentStatus> {
        match self {
            Event::DeploymentStatusChanged { to, .. } => Some(*to),
            Event::DeploymentProgress { status, .. } => Some(*status),
            Event::DeploymentCreated { .. } => Some(DeploymentStatus::Queued),
            Event::DeploymentLogAppended { .. } => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Event::DeploymentStatusChanged { to, .. } if to.is_terminal()
        )
    }
}
