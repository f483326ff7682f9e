//! Deployment workflow engine.
//!
//! A [`DeploymentLauncher`] spawns one [`WorkflowOrchestrator`] run per
//! deployment. Each run owns a single remote session, provisions the
//! toolchain through the [`DependencyInstaller`], then scaffolds, builds,
//! starts and verifies the chain, writing every step through a
//! [`DeploymentReporter`].

pub mod commands;
pub mod config;
pub mod error;
pub mod installer;
pub mod launcher;
pub mod phase;
pub mod reporter;
pub mod resources;
pub mod runner;
pub mod workflow;

pub use config::WorkflowConfig;
pub use error::{OrchestratorError, Result};
pub use installer::{Dependency, DependencyInstaller, Platform};
pub use launcher::DeploymentLauncher;
pub use phase::Phase;
pub use reporter::{DbReporter, DeploymentReporter};
pub use resources::SessionGuard;
pub use runner::CommandRunner;
pub use workflow::{DeploymentJob, WorkflowOrchestrator};
