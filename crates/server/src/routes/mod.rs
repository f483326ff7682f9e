mod admin;
mod deployments;
mod health;
mod sse;

pub use admin::*;
pub use deployments::*;
pub use health::*;
pub use sse::*;
