use std::time::Duration;

use launchpad_core::CoreError;
use thiserror::Error;

use crate::phase::Phase;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("SSH connection failed: {0}")]
    Connection(String),

    #[error("Dependency installation failed: {dependency}: {reason}")]
    DependencyInstall { dependency: String, reason: String },

    /// `stderr` is kept exactly as the remote command produced it.
    #[error("{phase} failed: {stderr}")]
    CommandFailed { phase: Phase, stderr: String },

    #[error("Chain failed to start: {0}")]
    Verification(String),

    #[error("Deployment cancelled")]
    Cancelled,

    #[error("{phase} timed out after {timeout:?}")]
    PhaseTimeout { phase: Phase, timeout: Duration },

    #[error("Remote session error: {0}")]
    Remote(#[from] remote::RemoteError),

    #[error("Database error: {0}")]
    Database(#[from] db::DbError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl OrchestratorError {
    pub fn dependency(dependency: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DependencyInstall {
            dependency: dependency.into(),
            reason: reason.into(),
        }
    }

    pub fn command_failed(phase: Phase, stderr: impl Into<String>) -> Self {
        Self::CommandFailed {
            phase,
            stderr: stderr.into(),
        }
    }

    /// Failures that come from the deployment target rather than from this
    /// process.
    pub fn is_remote_failure(&self) -> bool {
        !matches!(self, Self::Database(_) | Self::Core(_))
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_keeps_stderr() {
        let stderr = "main.go:12: undefined: Foo\n";
        let err = OrchestratorError::command_failed(Phase::Build, stderr);
        assert!(err.to_string().contains(stderr));
        assert!(err.to_string().starts_with("Build failed"));
    }

    #[test]
    fn test_dependency_error_names_dependency() {
        let err = OrchestratorError::dependency("git", "Unable to install Git on this system");
        assert_eq!(
            err.to_string(),
            "Dependency installation failed: git: Unable to install Git on this system"
        );
        assert!(err.is_remote_failure());
    }
}
