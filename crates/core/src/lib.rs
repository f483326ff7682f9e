mod domain;
mod error;
pub mod state_machine;
pub mod validation;

pub use domain::*;
pub use error::*;
pub use state_machine::DeploymentStateMachine;
pub use validation::{validate_submission, ValidatedSubmission};
