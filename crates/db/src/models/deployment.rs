use launchpad_core::{Deployment, DeploymentStatus, DEFAULT_SSH_PORT};
use uuid::Uuid;

use super::{datetime_to_timestamp, timestamp_to_datetime};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DeploymentRow {
    pub id: String,
    pub chain_name: String,
    pub host: String,
    pub ssh_user: String,
    pub ssh_port: i64,
    pub contact_email: String,
    pub status: String,
    pub rpc_endpoint: Option<String>,
    pub api_endpoint: Option<String>,
    pub error_message: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl DeploymentRow {
    pub fn into_domain(self) -> Deployment {
        Deployment {
            id: Uuid::parse_str(&self.id).unwrap_or_default(),
            chain_name: self.chain_name,
            host: self.host,
            ssh_user: self.ssh_user,
            ssh_port: u16::try_from(self.ssh_port).unwrap_or(DEFAULT_SSH_PORT),
            contact_email: self.contact_email,
            status: DeploymentStatus::parse(&self.status).unwrap_or_default(),
            rpc_endpoint: self.rpc_endpoint,
            api_endpoint: self.api_endpoint,
            error_message: self.error_message,
            created_at: timestamp_to_datetime(self.created_at),
            updated_at: timestamp_to_datetime(self.updated_at),
        }
    }
}

impl From<&Deployment> for DeploymentRow {
    fn from(deployment: &Deployment) -> Self {
        Self {
            id: deployment.id.to_string(),
            chain_name: deployment.chain_name.clone(),
            host: deployment.host.clone(),
            ssh_user: deployment.ssh_user.clone(),
            ssh_port: i64::from(deployment.ssh_port),
            contact_email: deployment.contact_email.clone(),
            status: deployment.status.as_str().to_string(),
            rpc_endpoint: deployment.rpc_endpoint.clone(),
            api_endpoint: deployment.api_endpoint.clone(),
            error_message: deployment.error_message.clone(),
            created_at: datetime_to_timestamp(deployment.created_at),
            updated_at: datetime_to_timestamp(deployment.updated_at),
        }
    }
}
