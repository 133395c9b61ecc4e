//! OAuth token operations.

mod requests;
mod service;

pub use requests::*;
pub use service::*;
