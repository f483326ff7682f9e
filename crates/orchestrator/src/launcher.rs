use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::workflow::{DeploymentJob, WorkflowOrchestrator};

/// Spawns one workflow task per deployment and keeps a cancellation token
/// for each task still running.
#[derive(Clone)]
pub struct DeploymentLauncher {
    orchestrator: Arc<WorkflowOrchestrator>,
    running: Arc<Mutex<HashMap<Uuid, CancellationToken>>>,
    tracker: TaskTracker,
}

impl DeploymentLauncher {
    pub fn new(orchestrator: Arc<WorkflowOrchestrator>) -> Self {
        Self {
            orchestrator,
            running: Arc::new(Mutex::new(HashMap::new())),
            tracker: TaskTracker::new(),
        }
    }

    /// Fire and forget. The outcome is only visible through the record.
    pub fn launch(&self, job: DeploymentJob) {
        let deployment_id = job.deployment_id;
        let token = CancellationToken::new();
        self.registry().insert(deployment_id, token.clone());

        let orchestrator = Arc::clone(&self.orchestrator);
        let running = Arc::clone(&self.running);

        debug!(deployment_id = %deployment_id, "Spawning deployment task");
        self.tracker.spawn(async move {
            let status = orchestrator.run(job, token).await;
            running
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .remove(&deployment_id);
            debug!(deployment_id = %deployment_id, status = %status, "Deployment task exited");
        });
    }

    /// Requests cancellation. Returns false when no task is running for the
    /// deployment.
    pub fn cancel(&self, deployment_id: Uuid) -> bool {
        match self.registry().get(&deployment_id) {
            Some(token) => {
                info!(deployment_id = %deployment_id, "Cancellation requested");
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self, deployment_id: Uuid) -> bool {
        self.registry().contains_key(&deployment_id)
    }

    pub fn running_count(&self) -> usize {
        self.registry().len()
    }

    /// Cancels every running deployment and waits up to `grace` for the
    /// tasks to record their outcome.
    pub async fn shutdown(&self, grace: Duration) {
        let tokens: Vec<CancellationToken> = self.registry().values().cloned().collect();
        if !tokens.is_empty() {
            info!(count = tokens.len(), "Cancelling running deployments");
        }
        for token in tokens {
            token.cancel();
        }

        self.tracker.close();
        if tokio::time::timeout(grace, self.tracker.wait()).await.is_err() {
            warn!(
                remaining = self.running_count(),
                "Deployments still running after shutdown grace period"
            );
        }
    }

    fn registry(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, CancellationToken>> {
        self.running
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
