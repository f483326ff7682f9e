use launchpad_core::CoreError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Deployment not found: {0}")]
    DeploymentNotFound(Uuid),

    #[error("Chain name '{0}' is already in use by an active deployment")]
    ChainNameTaken(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Deployment {0} was updated concurrently")]
    ConcurrentUpdate(Uuid),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, DbError>;
