//! Data model for the thermostat API.
//!
//! Payload types decoded from `getthermostatsdata` plus the mode
//! enumerations shared by requests and responses.

pub mod device;
pub mod mode;

pub use device::*;
pub use mode::*;
