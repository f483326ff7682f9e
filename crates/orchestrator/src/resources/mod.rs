//! RAII guards for resources held during a workflow run.
//!
//! - [`SessionGuard`] closes the remote session on every exit path

mod session_guard;

pub use session_guard::SessionGuard;
