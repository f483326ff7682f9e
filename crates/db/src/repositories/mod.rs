mod deployment_log_repository;
mod deployment_repository;

pub use deployment_log_repository::*;
pub use deployment_repository::*;
