use async_trait::async_trait;
use db::{DeploymentLogRepository, DeploymentRepository};
use events::{Event, EventBus};
use launchpad_core::{NewLogEntry, StatusUpdate};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::Result;

/// Where a workflow run writes its status changes and log entries.
#[async_trait]
pub trait DeploymentReporter: Send + Sync {
    async fn update_status(&self, deployment_id: Uuid, update: StatusUpdate) -> Result<()>;

    async fn append_log(&self, deployment_id: Uuid, entry: NewLogEntry) -> Result<()>;
}

/// Writes through to the database and mirrors every write on the event bus.
#[derive(Clone)]
pub struct DbReporter {
    deployments: DeploymentRepository,
    logs: DeploymentLogRepository,
    event_bus: Option<EventBus>,
}

impl DbReporter {
    pub fn new(deployments: DeploymentRepository, logs: DeploymentLogRepository) -> Self {
        Self {
            deployments,
            logs,
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    fn emit(&self, event: Event) {
        if let Some(bus) = &self.event_bus {
            bus.emit(event);
        }
    }
}

#[async_trait]
impl DeploymentReporter for DbReporter {
    async fn update_status(&self, deployment_id: Uuid, update: StatusUpdate) -> Result<()> {
        let change = self.deployments.update_status(deployment_id, &update).await?;

        if change.is_progress_note() {
            let message = update.message.unwrap_or_default();
            debug!(deployment_id = %deployment_id, status = %change.from, "{}", message);
            self.emit(Event::DeploymentProgress {
                deployment_id,
                status: change.from,
                message,
            });
        } else {
            info!(
                deployment_id = %deployment_id,
                from = %change.from,
                to = %change.deployment.status,
                "Deployment status changed"
            );
            self.emit(Event::DeploymentStatusChanged {
                deployment_id,
                from: change.from,
                to: change.deployment.status,
                message: update.message,
            });
        }

        Ok(())
    }

    async fn append_log(&self, deployment_id: Uuid, entry: NewLogEntry) -> Result<()> {
        let stored = self.logs.append(deployment_id, &entry).await?;
        self.emit(Event::DeploymentLogAppended {
            deployment_id,
            log_id: stored.id,
            step: stored.step,
        });
        Ok(())
    }
}
