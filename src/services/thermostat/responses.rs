//! Response payloads for thermostat operations.

use serde::Deserialize;

use crate::types::Device;

/// Envelope of `getthermostatsdata`.
#[derive(Debug, Clone, Deserialize)]
pub struct GetThermostatsDataResponse {
    /// Application-level status, `"ok"` on success
    pub status: String,
    /// Payload body
    pub body: ThermostatsDataBody,
}

/// Devices payload of `getthermostatsdata`.
#[derive(Debug, Clone, Deserialize)]
pub struct ThermostatsDataBody {
    /// Every station visible to the account
    #[serde(default)]
    pub devices: Vec<Device>,
}

/// Envelope of the mode-setting endpoints, which return no payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SetModeResponse {
    /// Application-level status, `"ok"` on success
    pub status: String,
}
