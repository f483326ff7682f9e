use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use launchpad_core::{
    Deployment, DeploymentStatus, Endpoints, LogStep, NewLogEntry, StatusUpdate,
};
use remote::{ConnectionSpec, RemoteSession, SessionConnector};
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::commands::{self, RemoteCommand};
use crate::config::WorkflowConfig;
use crate::error::{OrchestratorError, Result};
use crate::installer::DependencyInstaller;
use crate::phase::Phase;
use crate::reporter::DeploymentReporter;
use crate::resources::SessionGuard;
use crate::runner::CommandRunner;

/// Everything one execution unit needs. The key lives only here.
#[derive(Debug, Clone)]
pub struct DeploymentJob {
    pub deployment_id: Uuid,
    pub chain_name: String,
    pub connection: ConnectionSpec,
}

impl DeploymentJob {
    pub fn new(deployment: &Deployment, private_key: SecretString) -> Self {
        Self {
            deployment_id: deployment.id,
            chain_name: deployment.chain_name.clone(),
            connection: ConnectionSpec::new(
                deployment.host.clone(),
                deployment.ssh_port,
                deployment.ssh_user.clone(),
                private_key,
            ),
        }
    }
}

/// Drives one deployment from QUEUED to a terminal status.
pub struct WorkflowOrchestrator {
    connector: Arc<dyn SessionConnector>,
    reporter: Arc<dyn DeploymentReporter>,
    config: WorkflowConfig,
}

impl WorkflowOrchestrator {
    pub fn new(
        connector: Arc<dyn SessionConnector>,
        reporter: Arc<dyn DeploymentReporter>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            connector,
            reporter,
            config,
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Runs every phase and returns the terminal status that was written.
    pub async fn run(&self, job: DeploymentJob, cancel: CancellationToken) -> DeploymentStatus {
        let deployment_id = job.deployment_id;
        let runner = CommandRunner::new(deployment_id, Arc::clone(&self.reporter));
        let mut guard: Option<SessionGuard> = None;

        info!(
            deployment_id = %deployment_id,
            chain_name = %job.chain_name,
            remote = %job.connection.target(),
            "Starting deployment"
        );

        let outcome = self.execute(&job, &runner, &cancel, &mut guard).await;

        let status = match outcome {
            Ok(endpoints) => self.complete(&runner, endpoints).await,
            Err(e) => {
                self.fail(&runner, &e).await;
                DeploymentStatus::Failed
            }
        };

        if let Some(mut guard) = guard {
            let entry = match guard.close().await {
                Ok(()) => NewLogEntry::note(LogStep::Cleanup, "Remote session closed"),
                Err(e) => {
                    warn!(deployment_id = %deployment_id, error = %e, "Session close failed");
                    NewLogEntry::new(LogStep::Cleanup)
                        .with_error(format!("Failed to close remote session: {}", e))
                }
            };
            if let Err(e) = runner.log(entry).await {
                warn!(deployment_id = %deployment_id, error = %e, "Failed to log cleanup");
            }
        }

        info!(deployment_id = %deployment_id, status = %status, "Deployment finished");
        status
    }

    async fn execute(
        &self,
        job: &DeploymentJob,
        runner: &CommandRunner,
        cancel: &CancellationToken,
        slot: &mut Option<SessionGuard>,
    ) -> Result<Endpoints> {
        // Connect
        self.enter(runner, cancel, Phase::Connect).await?;
        let connection = job
            .connection
            .clone()
            .with_connect_timeout(self.config.connect_timeout);
        let session = self
            .timed(Phase::Connect, async {
                self.connector
                    .open(&connection)
                    .await
                    .map_err(|e| OrchestratorError::Connection(e.to_string()))
            })
            .await?;
        let guard = slot.insert(SessionGuard::new(job.deployment_id, session));
        runner
            .log(NewLogEntry::note(
                LogStep::Connect,
                format!("Connected to {}", connection.target()),
            ))
            .await?;
        let session = guard.session_mut()?;

        // Install
        self.enter(runner, cancel, Phase::Install).await?;
        self.timed(Phase::Install, async {
            DependencyInstaller::new(runner)
                .with_cancel(cancel)
                .check_and_install(session)
                .await
        })
        .await?;

        // Scaffold
        self.enter(runner, cancel, Phase::Scaffold).await?;
        let scaffold = commands::scaffold_chain(&job.chain_name)?;
        self.run_checked(runner, session, Phase::Scaffold, &scaffold)
            .await?;

        // Build
        self.enter(runner, cancel, Phase::Build).await?;
        let build = commands::build_chain(&job.chain_name)?;
        self.run_checked(runner, session, Phase::Build, &build)
            .await?;

        // Start
        self.enter(runner, cancel, Phase::Start).await?;
        let start = commands::start_chain(&job.chain_name)?;
        self.run_checked(runner, session, Phase::Start, &start)
            .await?;

        runner
            .note(
                DeploymentStatus::Starting,
                LogStep::Start,
                "Waiting for blockchain to start...",
            )
            .await?;
        self.pause(cancel, self.config.settle_delay).await?;

        // Verify
        self.enter(runner, cancel, Phase::Verify).await?;
        self.timed(Phase::Verify, self.verify(runner, session, cancel))
            .await?;

        Ok(Endpoints::for_host(
            &job.connection.host,
            self.config.rpc_port,
            self.config.api_port,
        ))
    }

    /// Phase boundary: honour cancellation, then record the new status.
    async fn enter(
        &self,
        runner: &CommandRunner,
        cancel: &CancellationToken,
        phase: Phase,
    ) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(OrchestratorError::Cancelled);
        }

        let status = phase.status();
        info!(deployment_id = %runner.deployment_id(), phase = %phase, "Entering phase");
        self.reporter
            .update_status(
                runner.deployment_id(),
                StatusUpdate::progress(status, status.progress_hint()),
            )
            .await?;
        runner
            .log(NewLogEntry::note(phase.log_step(), status.progress_hint()))
            .await
    }

    /// Bounds `work` by the phase timeout. Cancellation is not checked here:
    /// a command that has started runs to completion and gets logged.
    async fn timed<T>(&self, phase: Phase, work: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.config.phase_timeout, work).await {
            Ok(result) => result,
            Err(_) => Err(OrchestratorError::PhaseTimeout {
                phase,
                timeout: self.config.phase_timeout,
            }),
        }
    }

    async fn run_checked(
        &self,
        runner: &CommandRunner,
        session: &mut dyn RemoteSession,
        phase: Phase,
        command: &RemoteCommand,
    ) -> Result<()> {
        let output = self
            .timed(phase, runner.run(session, phase.log_step(), command))
            .await?;
        if output.success() {
            return Ok(());
        }

        let captured = if output.stderr.trim().is_empty() {
            output.stdout
        } else {
            output.stderr
        };
        Err(OrchestratorError::command_failed(phase, captured))
    }

    /// Probes the node's RPC status endpoint until it reports node info or
    /// the attempts run out.
    async fn verify(
        &self,
        runner: &CommandRunner,
        session: &mut dyn RemoteSession,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let probe = commands::probe_node(self.config.rpc_port);
        let attempts = self.config.verify_attempts.max(1);

        for attempt in 1..=attempts {
            if cancel.is_cancelled() {
                return Err(OrchestratorError::Cancelled);
            }
            let output = runner.run(session, LogStep::Verify, &probe).await?;
            if output.success() && commands::node_is_ready(&output.stdout) {
                return Ok(());
            }

            if attempt < attempts {
                runner
                    .note(
                        DeploymentStatus::Verifying,
                        LogStep::Verify,
                        format!("Node not ready yet (attempt {}/{})", attempt, attempts),
                    )
                    .await?;
                self.pause(cancel, self.config.verify_interval).await?;
            }
        }

        Err(OrchestratorError::Verification(format!(
            "RPC status endpoint on port {} did not report node info after {} attempt(s)",
            self.config.rpc_port, attempts
        )))
    }

    /// Sleeps without running any command, so cancellation is honoured.
    async fn pause(&self, cancel: &CancellationToken, delay: Duration) -> Result<()> {
        if delay.is_zero() {
            return Ok(());
        }
        tokio::select! {
            _ = tokio::time::sleep(delay) => Ok(()),
            _ = cancel.cancelled() => Err(OrchestratorError::Cancelled),
        }
    }

    /// Returns the status that ended up persisted. Once COMPLETED is written
    /// a failing log append only warns, since the record cannot move on.
    async fn complete(&self, runner: &CommandRunner, endpoints: Endpoints) -> DeploymentStatus {
        let deployment_id = runner.deployment_id();
        let summary = format!("RPC: {}, API: {}", endpoints.rpc, endpoints.api);

        if let Err(e) = self
            .reporter
            .update_status(deployment_id, StatusUpdate::completed(endpoints))
            .await
        {
            error!(deployment_id = %deployment_id, error = %e, "Failed to record completion");
            self.fail(runner, &e).await;
            return DeploymentStatus::Failed;
        }

        if let Err(e) = runner
            .log(NewLogEntry::note(
                LogStep::Complete,
                format!("{} {}", DeploymentStatus::Completed.progress_hint(), summary),
            ))
            .await
        {
            warn!(deployment_id = %deployment_id, error = %e, "Failed to log completion");
        }
        DeploymentStatus::Completed
    }

    async fn fail(&self, runner: &CommandRunner, cause: &OrchestratorError) {
        let deployment_id = runner.deployment_id();
        let message = cause.to_string();

        if cause.is_remote_failure() {
            warn!(deployment_id = %deployment_id, error = %message, "Deployment failed");
        } else {
            error!(deployment_id = %deployment_id, error = %message, "Deployment failed");
        }

        if let Err(e) = runner
            .log(NewLogEntry::new(LogStep::Failed).with_error(message.clone()))
            .await
        {
            error!(deployment_id = %deployment_id, error = %e, "Failed to log failure");
        }
        if let Err(e) = self
            .reporter
            .update_status(deployment_id, StatusUpdate::failed(message))
            .await
        {
            error!(deployment_id = %deployment_id, error = %e, "Failed to record failure");
        }
    }
}
