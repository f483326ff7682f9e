//! Deployment event bus.
//!
//! Status transitions, progress notes and log appends are broadcast here so
//! that anything in-process can follow a deployment without polling the
//! database.

mod bus;
mod types;

pub use bus::{DeploymentEvents, EventBus};
pub use types::*;
