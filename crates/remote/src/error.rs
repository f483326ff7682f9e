use thiserror::Error;

/// Transport-level failures. A command that runs and exits non-zero is not
/// an error here; it comes back as a `CommandOutput`.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Connection timed out after {0} seconds")]
    Timeout(u64),

    #[error("Session is closed")]
    Closed,

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RemoteError>;
