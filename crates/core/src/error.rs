use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Deployment not found: {0}")]
    DeploymentNotFound(Uuid),

    #[error("Invalid deployment status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Invalid chain name: {0}")]
    InvalidChainName(String),

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

impl CoreError {
    /// Field-level messages when this is a validation failure.
    pub fn details(&self) -> Vec<String> {
        match self {
            CoreError::Validation(details) => details.clone(),
            CoreError::InvalidChainName(reason) => vec![reason.clone()],
            other => vec![other.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let id = Uuid::new_v4();
        let error = CoreError::DeploymentNotFound(id);
        assert!(error.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_validation_display_joins_details() {
        let error = CoreError::Validation(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(error.to_string(), "Validation failed: a; b");
        assert_eq!(error.details().len(), 2);
    }
}
