use std::sync::Arc;

use db::{DeploymentLogRepository, DeploymentRepository};
use events::EventBus;
use orchestrator::{DbReporter, DeploymentLauncher, WorkflowConfig, WorkflowOrchestrator};
use remote::SessionConnector;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub deployments: DeploymentRepository,
    pub logs: DeploymentLogRepository,
    pub event_bus: EventBus,
    pub launcher: DeploymentLauncher,
}

impl AppState {
    /// Wires the repositories, the event bus and the launcher around one pool.
    pub fn new(
        pool: SqlitePool,
        connector: Arc<dyn SessionConnector>,
        config: WorkflowConfig,
    ) -> Self {
        let deployments = DeploymentRepository::new(pool.clone());
        let logs = DeploymentLogRepository::new(pool.clone());
        let event_bus = EventBus::new();

        let reporter = DbReporter::new(deployments.clone(), logs.clone())
            .with_event_bus(event_bus.clone());
        let orchestrator = WorkflowOrchestrator::new(connector, Arc::new(reporter), config);
        let launcher = DeploymentLauncher::new(Arc::new(orchestrator));

        Self {
            pool,
            deployments,
            logs,
            event_bus,
            launcher,
        }
    }
}
