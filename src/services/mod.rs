//! Service layer for the Netatmo API.
//!
//! Each service owns one slice of the API surface and runs its calls through
//! the shared request pipeline.

pub mod oauth;
pub mod thermostat;

pub use oauth::OAuthService;
pub use thermostat::ThermostatService;
