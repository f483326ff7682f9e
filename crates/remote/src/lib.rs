pub mod error;
pub mod openssh;
pub mod quote;
pub mod traits;

pub use error::{RemoteError, Result};
pub use openssh::OpenSshConnector;
pub use quote::{quote_path, shell_quote};
pub use traits::{CommandOutput, ConnectionSpec, ExecOptions, RemoteSession, SessionConnector};
