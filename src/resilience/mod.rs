//! Resilience patterns for transient API failures.

pub mod retry;

pub use retry::{with_retry, RetryConfig};
