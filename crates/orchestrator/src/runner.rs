use std::sync::Arc;

use launchpad_core::{DeploymentStatus, LogStep, NewLogEntry, StatusUpdate};
use remote::{CommandOutput, RemoteSession};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::commands::RemoteCommand;
use crate::error::Result;
use crate::reporter::DeploymentReporter;

/// Captured output longer than this is cut before it is stored.
const MAX_LOGGED_OUTPUT: usize = 16 * 1024;

/// Runs remote commands for one deployment and records each of them.
#[derive(Clone)]
pub struct CommandRunner {
    deployment_id: Uuid,
    reporter: Arc<dyn DeploymentReporter>,
}

impl CommandRunner {
    pub fn new(deployment_id: Uuid, reporter: Arc<dyn DeploymentReporter>) -> Self {
        Self {
            deployment_id,
            reporter,
        }
    }

    pub fn deployment_id(&self) -> Uuid {
        self.deployment_id
    }

    pub fn reporter(&self) -> &Arc<dyn DeploymentReporter> {
        &self.reporter
    }

    /// Executes `command` and appends a log entry with its output. A non-zero
    /// exit is returned as data; only transport failures are errors.
    pub async fn run(
        &self,
        session: &mut dyn RemoteSession,
        step: LogStep,
        command: &RemoteCommand,
    ) -> Result<CommandOutput> {
        let shown = command.display();
        debug!(deployment_id = %self.deployment_id, step = step.as_str(), "Running: {}", shown);

        let output = match session.execute(&command.command, &command.options).await {
            Ok(output) => output,
            Err(e) => {
                warn!(deployment_id = %self.deployment_id, error = %e, "Remote command did not run");
                self.log(
                    NewLogEntry::new(step)
                        .with_command(shown)
                        .with_error(e.to_string()),
                )
                .await?;
                return Err(e.into());
            }
        };

        let mut entry = NewLogEntry::new(step).with_command(shown);
        if !output.stdout.trim().is_empty() {
            entry = entry.with_output(truncate(&output.stdout));
        }
        if !output.stderr.trim().is_empty() {
            entry = entry.with_error(truncate(&output.stderr));
        } else if !output.success() {
            entry = entry.with_error(format!("exit code {}", output.exit_code));
        }
        self.log(entry).await?;

        Ok(output)
    }

    /// Progress note: the status stays where it is, the message changes and
    /// a matching log entry is written.
    pub async fn note(
        &self,
        status: DeploymentStatus,
        step: LogStep,
        message: impl Into<String>,
    ) -> Result<()> {
        let message = message.into();
        self.reporter
            .update_status(
                self.deployment_id,
                StatusUpdate::progress(status, message.clone()),
            )
            .await?;
        self.log(NewLogEntry::note(step, message)).await
    }

    pub async fn log(&self, entry: NewLogEntry) -> Result<()> {
        self.reporter.append_log(self.deployment_id, entry).await
    }
}

fn truncate(text: &str) -> String {
    if text.len() <= MAX_LOGGED_OUTPUT {
        return text.to_string();
    }
    let mut end = MAX_LOGGED_OUTPUT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}\n... [truncated {} bytes]", &text[..end], text.len() - end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use remote::{ExecOptions, RemoteError};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingReporter {
        entries: Mutex<Vec<NewLogEntry>>,
    }

    #[async_trait]
    impl DeploymentReporter for RecordingReporter {
        async fn update_status(&self, _deployment_id: Uuid, _update: StatusUpdate) -> Result<()> {
            Ok(())
        }

        async fn append_log(&self, _deployment_id: Uuid, entry: NewLogEntry) -> Result<()> {
            self.entries.lock().unwrap().push(entry);
            Ok(())
        }
    }

    struct ScriptedSession {
        reply: Option<CommandOutput>,
    }

    #[async_trait]
    impl RemoteSession for ScriptedSession {
        async fn execute(
            &mut self,
            _command: &str,
            _options: &ExecOptions,
        ) -> remote::Result<CommandOutput> {
            self.reply.clone().ok_or(RemoteError::Closed)
        }

        async fn close(&mut self) -> remote::Result<()> {
            Ok(())
        }

        fn is_closed(&self) -> bool {
            false
        }
    }

    fn runner() -> (CommandRunner, Arc<RecordingReporter>) {
        let reporter = Arc::new(RecordingReporter::default());
        let runner = CommandRunner::new(Uuid::new_v4(), reporter.clone());
        (runner, reporter)
    }

    #[tokio::test]
    async fn test_run_logs_command_with_output() {
        let (runner, reporter) = runner();
        let mut session = ScriptedSession {
            reply: Some(CommandOutput {
                exit_code: 1,
                stdout: String::new(),
                stderr: "undefined: app.New".to_string(),
            }),
        };
        let command = RemoteCommand::new("ignite chain build").in_dir("~/alpha");

        let output = runner
            .run(&mut session, LogStep::Build, &command)
            .await
            .unwrap();

        assert!(!output.success());
        let entries = reporter.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].step, LogStep::Build);
        assert_eq!(entries[0].command.as_deref(), Some(command.display().as_str()));
        assert_eq!(entries[0].error.as_deref(), Some("undefined: app.New"));
    }

    #[tokio::test]
    async fn test_run_logs_transport_failure() {
        let (runner, reporter) = runner();
        let mut session = ScriptedSession { reply: None };

        let result = runner
            .run(&mut session, LogStep::Scaffold, &RemoteCommand::new("ls"))
            .await;

        assert!(result.is_err());
        let entries = reporter.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].command.as_deref(), Some("ls"));
        assert_eq!(entries[0].error.as_deref(), Some("Session is closed"));
    }

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate("ok\n"), "ok\n");
    }

    #[test]
    fn test_truncate_long_text() {
        let long = "é".repeat(MAX_LOGGED_OUTPUT);
        let cut = truncate(&long);
        assert!(cut.len() < long.len());
        assert!(cut.ends_with("bytes]"));
    }
}
