use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use orchestrator::WorkflowConfig;
use serde::{Deserialize, Serialize};

pub const LAUNCHPAD_DIR: &str = ".launchpad";
pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_DB_NAME: &str = "launchpad.db";
pub const DEFAULT_PORT: u16 = 3000;

/// Contents of `.launchpad/config.toml`. Every section and key may be
/// omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchpadConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub orchestrator: OrchestratorConfig,
    pub chain: ChainConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Relative paths resolve against the `.launchpad` directory.
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_NAME),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub settle_delay_secs: u64,
    pub verify_attempts: u32,
    pub verify_interval_secs: u64,
    pub phase_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        let workflow = WorkflowConfig::default();
        Self {
            settle_delay_secs: workflow.settle_delay.as_secs(),
            verify_attempts: workflow.verify_attempts,
            verify_interval_secs: workflow.verify_interval.as_secs(),
            phase_timeout_secs: workflow.phase_timeout.as_secs(),
            connect_timeout_secs: workflow.connect_timeout.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub rpc_port: u16,
    pub api_port: u16,
}

impl Default for ChainConfig {
    fn default() -> Self {
        let workflow = WorkflowConfig::default();
        Self {
            rpc_port: workflow.rpc_port,
            api_port: workflow.api_port,
        }
    }
}

impl LaunchpadConfig {
    /// Reads `<dir>/config.toml`, falling back to defaults when it is absent.
    pub async fn load(launchpad_dir: &Path) -> Result<Self> {
        let path = launchpad_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    pub async fn write(&self, launchpad_dir: &Path) -> Result<()> {
        tokio::fs::create_dir_all(launchpad_dir).await?;
        let content = toml::to_string_pretty(self)?;
        tokio::fs::write(launchpad_dir.join(CONFIG_FILE), content).await?;
        Ok(())
    }

    pub fn database_path(&self, launchpad_dir: &Path) -> PathBuf {
        if self.database.path.is_absolute() {
            self.database.path.clone()
        } else {
            launchpad_dir.join(&self.database.path)
        }
    }

    pub fn workflow(&self) -> WorkflowConfig {
        let o = &self.orchestrator;
        WorkflowConfig::default()
            .with_settle_delay(Duration::from_secs(o.settle_delay_secs))
            .with_verify_attempts(o.verify_attempts)
            .with_verify_interval(Duration::from_secs(o.verify_interval_secs))
            .with_phase_timeout(Duration::from_secs(o.phase_timeout_secs))
            .with_connect_timeout(Duration::from_secs(o.connect_timeout_secs))
            .with_ports(self.chain.rpc_port, self.chain.api_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = LaunchpadConfig::load(temp_dir.path()).await.unwrap();
        assert_eq!(config, LaunchpadConfig::default());
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.orchestrator.settle_delay_secs, 15);
    }

    #[tokio::test]
    async fn test_partial_file_keeps_other_defaults() {
        let temp_dir = TempDir::new().unwrap();
        tokio::fs::write(
            temp_dir.path().join(CONFIG_FILE),
            "[orchestrator]\nverify_attempts = 5\n\n[chain]\nrpc_port = 36657\n",
        )
        .await
        .unwrap();

        let config = LaunchpadConfig::load(temp_dir.path()).await.unwrap();
        assert_eq!(config.orchestrator.verify_attempts, 5);
        assert_eq!(config.orchestrator.settle_delay_secs, 15);
        assert_eq!(config.chain.rpc_port, 36657);
        assert_eq!(config.chain.api_port, 1317);

        let workflow = config.workflow();
        assert_eq!(workflow.verify_attempts, 5);
        assert_eq!(workflow.rpc_port, 36657);
    }

    #[tokio::test]
    async fn test_write_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join(LAUNCHPAD_DIR);
        let mut config = LaunchpadConfig::default();
        config.server.port = 8080;

        config.write(&dir).await.unwrap();

        let loaded = LaunchpadConfig::load(&dir).await.unwrap();
        assert_eq!(loaded.server.port, 8080);
    }

    #[tokio::test]
    async fn test_invalid_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        tokio::fs::write(temp_dir.path().join(CONFIG_FILE), "[server]\nport = \"x\"\n")
            .await
            .unwrap();
        assert!(LaunchpadConfig::load(temp_dir.path()).await.is_err());
    }

    #[test]
    fn test_database_path_resolution() {
        let mut config = LaunchpadConfig::default();
        let dir = Path::new("/srv/app/.launchpad");
        assert_eq!(config.database_path(dir), dir.join(DEFAULT_DB_NAME));

        config.database.path = PathBuf::from("/var/lib/launchpad.db");
        assert_eq!(
            config.database_path(dir),
            PathBuf::from("/var/lib/launchpad.db")
        );
    }
}
