pub(crate) mod chain_name;
mod deployment;
mod log_entry;
mod stats;

pub use chain_name::*;
pub use deployment::*;
pub use log_entry::*;
pub use stats::*;
