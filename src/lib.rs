//! Vaillant Netatmo API Client
//!
//! HTTP client for the Vaillant-branded Netatmo thermostat API with:
//! - OAuth2 password-grant authentication with transparent token refresh
//! - Automatic retry with full-jitter exponential backoff
//! - Typed thermostat operations (station data, system mode, minor modes)
//! - Credential redaction in errors and debug output
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use vaillant_netatmo_client::{ClientCredentials, NetatmoConfig};
//! use vaillant_netatmo_client::services::oauth::PasswordGrantRequest;
//! use vaillant_netatmo_client::services::thermostat::GetThermostatsDataRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = ClientCredentials::new("client-id", "client-secret");
//!     let client =
//!         vaillant_netatmo_client::create_client(NetatmoConfig::default(), credentials)?;
//!
//!     client
//!         .oauth()
//!         .fetch_token(PasswordGrantRequest::new(
//!             "user@example.com",
//!             "secret",
//!             "vaillant",
//!             "1.0.0.0",
//!         ))
//!         .await?;
//!
//!     let devices = client
//!         .thermostat()
//!         .get_thermostats_data(GetThermostatsDataRequest::default())
//!         .await?;
//!     println!("{} station(s)", devices.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// Core modules
pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod transport;
pub mod types;

// Services
pub mod services;

// Resilience
pub mod resilience;

// Time source
pub mod time;

// Testing utilities
pub mod fixtures;
pub mod mocks;

// Tests
#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use auth::{ClientCredentials, Token, TokenStore};
pub use client::NetatmoClient;
pub use config::{NetatmoConfig, NetatmoConfigBuilder, TokenPlacement};
pub use errors::{NetatmoError, NetatmoResult};
pub use resilience::RetryConfig;

/// Default base URL for the Vaillant-branded Netatmo API
pub const DEFAULT_BASE_URL: &str = "https://api.netatmo.com/";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Default OAuth scope requested with the password grant
pub const DEFAULT_SCOPE: &str = "read_thermostat write_thermostat";

/// Create a client with the given configuration and application credentials
pub fn create_client(
    config: NetatmoConfig,
    credentials: ClientCredentials,
) -> NetatmoResult<NetatmoClient> {
    NetatmoClient::new(config, credentials)
}
