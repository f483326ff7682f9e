use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::Result;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything needed to open a session. `Debug` never prints the key.
#[derive(Debug, Clone)]
pub struct ConnectionSpec {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub private_key: SecretString,
    pub connect_timeout: Duration,
}

impl ConnectionSpec {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        private_key: SecretString,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
            private_key,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// `user@host:port`, for log lines.
    pub fn target(&self) -> String {
        format!("{}@{}:{}", self.user, self.host, self.port)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOptions {
    /// Directory to `cd` into before running the command. A leading `~/` is
    /// resolved against the remote user's home.
    pub working_directory: Option<String>,
}

impl ExecOptions {
    pub fn in_dir(dir: impl Into<String>) -> Self {
        Self {
            working_directory: Some(dir.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stderr when there is any, stdout otherwise.
    pub fn error_text(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

/// Opens authenticated command channels to a remote host.
#[async_trait]
pub trait SessionConnector: Send + Sync {
    async fn open(&self, spec: &ConnectionSpec) -> Result<Box<dyn RemoteSession>>;
}

/// One open command channel. Commands run sequentially.
#[async_trait]
pub trait RemoteSession: Send {
    /// Run a command through the remote shell.
    async fn execute(&mut self, command: &str, options: &ExecOptions) -> Result<CommandOutput>;

    /// Tear the channel down. Calling it again is a no-op.
    async fn close(&mut self) -> Result<()>;

    fn is_closed(&self) -> bool;
}
