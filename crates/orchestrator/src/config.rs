use std::time::Duration;

use launchpad_core::{DEFAULT_API_PORT, DEFAULT_RPC_PORT};

/// Tunables for one workflow run.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Pause between launching the chain and the first liveness probe.
    pub settle_delay: Duration,
    /// Liveness probes attempted before giving up. At least one is made.
    pub verify_attempts: u32,
    pub verify_interval: Duration,
    /// Upper bound on any single phase.
    pub phase_timeout: Duration,
    pub connect_timeout: Duration,
    pub rpc_port: u16,
    pub api_port: u16,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(15),
            verify_attempts: 1,
            verify_interval: Duration::from_secs(5),
            phase_timeout: Duration::from_secs(15 * 60),
            connect_timeout: Duration::from_secs(30),
            rpc_port: DEFAULT_RPC_PORT,
            api_port: DEFAULT_API_PORT,
        }
    }
}

impl WorkflowConfig {
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_verify_attempts(mut self, attempts: u32) -> Self {
        self.verify_attempts = attempts.max(1);
        self
    }

    pub fn with_verify_interval(mut self, interval: Duration) -> Self {
        self.verify_interval = interval;
        self
    }

    pub fn with_phase_timeout(mut self, timeout: Duration) -> Self {
        self.phase_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_ports(mut self, rpc_port: u16, api_port: u16) -> Self {
        self.rpc_port = rpc_port;
        self.api_port = api_port;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorkflowConfig::default();
        assert_eq!(config.settle_delay, Duration::from_secs(15));
        assert_eq!(config.verify_attempts, 1);
        assert_eq!(config.rpc_port, 26657);
        assert_eq!(config.api_port, 1317);
    }

    #[test]
    fn test_builder() {
        let config = WorkflowConfig::default()
            .with_settle_delay(Duration::ZERO)
            .with_verify_attempts(0)
            .with_ports(36657, 2317);
        assert_eq!(config.settle_delay, Duration::ZERO);
        assert_eq!(config.verify_attempts, 1);
        assert_eq!(config.rpc_port, 36657);
    }
}
