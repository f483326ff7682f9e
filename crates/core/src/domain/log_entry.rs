use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Which part of the workflow a log entry belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LogStep {
    Connect,
    Install,
    Scaffold,
    Build,
    Start,
    Verify,
    Complete,
    Failed,
    Cleanup,
}

impl LogStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Install => "install",
            Self::Scaffold => "scaffold",
            Self::Build => "build",
            Self::Start => "start",
            Self::Verify => "verify",
            Self::Complete => "complete",
            Self::Failed => "failed",
            Self::Cleanup => "cleanup",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "connect" => Some(Self::Connect),
            "install" => Some(Self::Install),
            "scaffold" => Some(Self::Scaffold),
            "build" => Some(Self::Build),
            "start" => Some(Self::Start),
            "verify" => Some(Self::Verify),
            "complete" => Some(Self::Complete),
            "failed" => Some(Self::Failed),
            "cleanup" => Some(Self::Cleanup),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeploymentLogEntry {
    pub id: i64,
    pub deployment_id: Uuid,
    pub step: LogStep,
    pub command: Option<String>,
    pub output: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for appending a log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLogEntry {
    pub step: LogStep,
    pub command: Option<String>,
    pub output: Option<String>,
    pub error: Option<String>,
}

impl NewLogEntry {
    pub fn new(step: LogStep) -> Self {
        Self {
            step,
            command: None,
            output: None,
            error: None,
        }
    }

    /// A plain note, stored in the output column.
    pub fn note(step: LogStep, message: impl Into<String>) -> Self {
        Self::new(step).with_output(message)
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}
