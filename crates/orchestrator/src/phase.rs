use std::fmt;

use launchpad_core::{DeploymentStatus, LogStep};

/// One step of the provisioning workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Connect,
    Install,
    Scaffold,
    Build,
    Start,
    Verify,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Connect,
        Phase::Install,
        Phase::Scaffold,
        Phase::Build,
        Phase::Start,
        Phase::Verify,
    ];

    /// Status written when the phase begins.
    pub fn status(&self) -> DeploymentStatus {
        match self {
            Phase::Connect => DeploymentStatus::Connecting,
            Phase::Install => DeploymentStatus::Installing,
            Phase::Scaffold => DeploymentStatus::Scaffolding,
            Phase::Build => DeploymentStatus::Building,
            Phase::Start => DeploymentStatus::Starting,
            Phase::Verify => DeploymentStatus::Verifying,
        }
    }

    pub fn log_step(&self) -> LogStep {
        match self {
            Phase::Connect => LogStep::Connect,
            Phase::Install => LogStep::Install,
            Phase::Scaffold => LogStep::Scaffold,
            Phase::Build => LogStep::Build,
            Phase::Start => LogStep::Start,
            Phase::Verify => LogStep::Verify,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Connect => "Connect",
            Phase::Install => "Install",
            Phase::Scaffold => "Scaffold",
            Phase::Build => "Build",
            Phase::Start => "Start",
            Phase::Verify => "Verify",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
