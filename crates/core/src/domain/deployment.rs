use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::CoreError;
use crate::validation::ValidatedSubmission;

pub const DEFAULT_SSH_PORT: u16 = 22;
pub const DEFAULT_RPC_PORT: u16 = 26657;
pub const DEFAULT_API_PORT: u16 = 1317;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentStatus {
    #[default]
    Queued,
    Connecting,
    Installing,
    Scaffolding,
    Building,
    Starting,
    Verifying,
    Completed,
    Failed,
}

impl DeploymentStatus {
    /// Forward order of the happy path. `Failed` sits outside it.
    pub const FORWARD: [DeploymentStatus; 8] = [
        Self::Queued,
        Self::Connecting,
        Self::Installing,
        Self::Scaffolding,
        Self::Building,
        Self::Starting,
        Self::Verifying,
        Self::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "QUEUED",
            Self::Connecting => "CONNECTING",
            Self::Installing => "INSTALLING",
            Self::Scaffolding => "SCAFFOLDING",
            Self::Building => "BUILDING",
            Self::Starting => "STARTING",
            Self::Verifying => "VERIFYING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "QUEUED" => Some(Self::Queued),
            "CONNECTING" => Some(Self::Connecting),
            "INSTALLING" => Some(Self::Installing),
            "SCAFFOLDING" => Some(Self::Scaffolding),
            "BUILDING" => Some(Self::Building),
            "STARTING" => Some(Self::Starting),
            "VERIFYING" => Some(Self::Verifying),
            "COMPLETED" => Some(Self::Completed),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Position on the forward path, `None` for `Failed`.
    pub fn ordinal(&self) -> Option<usize> {
        Self::FORWARD.iter().position(|s| s == self)
    }

    /// Statuses that still hold a chain name (everything except `Failed`).
    pub fn holds_chain_name(&self) -> bool {
        !matches!(self, Self::Failed)
    }

    /// Human readable hint shown while a deployment is in this status.
    pub fn progress_hint(&self) -> &'static str {
        match self {
            Self::Queued => "Deployment queued and starting...",
            Self::Connecting => "Connecting to VPS...",
            Self::Installing => "Installing dependencies...",
            Self::Scaffolding => "Scaffolding blockchain...",
            Self::Building => "Building blockchain...",
            Self::Starting => "Starting blockchain services...",
            Self::Verifying => "Verifying blockchain is running...",
            Self::Completed => "Blockchain deployed successfully!",
            Self::Failed => "Deployment failed",
        }
    }

    /// Rough time left from this status, `None` once terminal.
    pub fn estimated_remaining(&self) -> Option<&'static str> {
        match self {
            Self::Queued => Some("3-6 minutes"),
            Self::Connecting | Self::Installing => Some("2-4 minutes"),
            Self::Scaffolding | Self::Building => Some("1-2 minutes"),
            Self::Starting | Self::Verifying => Some("under 1 minute"),
            Self::Completed | Self::Failed => None,
        }
    }
}

impl std::fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Endpoints {
    pub rpc: String,
    pub api: String,
}

impl Endpoints {
    pub fn for_host(host: &str, rpc_port: u16, api_port: u16) -> Self {
        Self {
            rpc: format!("http://{}:{}", host, rpc_port),
            api: format!("http://{}:{}", host, api_port),
        }
    }
}

/// A persisted deployment record. Key material is never part of it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Deployment {
    pub id: Uuid,
    pub chain_name: String,
    pub host: String,
    pub ssh_user: String,
    pub ssh_port: u16,
    pub contact_email: String,
    pub status: DeploymentStatus,
    pub rpc_endpoint: Option<String>,
    pub api_endpoint: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Deployment {
    pub fn new(submission: &ValidatedSubmission) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            chain_name: submission.chain_name.to_string(),
            host: submission.host.to_string(),
            ssh_user: submission.ssh_user.clone(),
            ssh_port: submission.ssh_port,
            contact_email: submission.contact_email.clone(),
            status: DeploymentStatus::default(),
            rpc_endpoint: None,
            api_endpoint: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn endpoints(&self) -> Option<Endpoints> {
        match (&self.rpc_endpoint, &self.api_endpoint) {
            (Some(rpc), Some(api)) => Some(Endpoints {
                rpc: rpc.clone(),
                api: api.clone(),
            }),
            _ => None,
        }
    }
}

/// One write against a deployment's status columns.
///
/// Built through the constructors so that endpoints only ever travel with
/// `Completed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: DeploymentStatus,
    pub message: Option<String>,
    pub endpoints: Option<Endpoints>,
}

impl StatusUpdate {
    pub fn transition(status: DeploymentStatus) -> Self {
        Self {
            status,
            message: None,
            endpoints: None,
        }
    }

    /// A status write that carries a note. Reusing the current status turns
    /// this into a message-only progress update.
    pub fn progress(status: DeploymentStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
            endpoints: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::progress(DeploymentStatus::Failed, message)
    }

    pub fn completed(endpoints: Endpoints) -> Self {
        Self {
            status: DeploymentStatus::Completed,
            message: Some(DeploymentStatus::Completed.progress_hint().to_string()),
            endpoints: Some(endpoints),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let is_completed = self.status == DeploymentStatus::Completed;
        if is_completed != self.endpoints.is_some() {
            return Err(CoreError::Validation(vec![format!(
                "Endpoints must be set exactly when status is COMPLETED (got {} with endpoints: {})",
                self.status,
                self.endpoints.is_some()
            )]));
        }
        Ok(())
    }
}

/// Raw submission body. Every field is optional so that missing fields are
/// reported together with the other field errors instead of failing JSON
/// extraction.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateDeploymentRequest {
    pub chain_name: Option<String>,
    pub vps_ip: Option<String>,
    pub ssh_user: Option<String>,
    pub ssh_port: Option<u16>,
    #[schema(value_type = Option<String>)]
    pub ssh_key: Option<SecretString>,
    pub contact_email: Option<String>,
}
