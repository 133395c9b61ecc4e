//! Test fixtures for vendor API payloads.
//!
//! Canned bodies for the token endpoint and the thermostat endpoints, plus
//! their typed equivalents, shared by unit and integration tests.

use serde_json::{json, Value};

use crate::types::{Device, Measured, Module, Setpoint, SystemMode};

/// Token-endpoint body as the vendor sends it for a fresh grant. The empty
/// `expires_at` mirrors real responses and must decode as "no expiry".
pub fn token_body(access_token: &str, refresh_token: &str) -> Value {
    json!({
        "access_token": access_token,
        "refresh_token": refresh_token,
        "expires_at": "",
        "expires_in": 10800,
    })
}

/// Token-endpoint body without any expiry information.
pub fn token_body_without_expiry(access_token: &str, refresh_token: &str) -> Value {
    json!({
        "access_token": access_token,
        "refresh_token": refresh_token,
    })
}

/// Minimal success envelope for the mode-setting endpoints.
pub fn status_ok_body() -> Value {
    json!({ "status": "ok" })
}

/// Application-level failure envelope.
pub fn status_error_body(status: &str) -> Value {
    json!({ "status": status })
}

/// Full `getthermostatsdata` body with one station and one module.
pub fn thermostats_data_body() -> Value {
    json!({
        "status": "ok",
        "time_server": 1622548800,
        "body": {
            "devices": [station_payload()],
        },
    })
}

/// One station payload, shaped the way the vendor returns it.
pub fn station_payload() -> Value {
    json!({
        "_id": "device-1",
        "type": "NAVaillant",
        "station_name": "Heating",
        "firmware": 19,
        "system_mode": "summer",
        "setpoint_default_duration": 120,
        "setpoint_hwb": { "setpoint_activate": false },
        "modules": [{
            "_id": "module-1",
            "type": "NAThermVaillant",
            "module_name": "Living room",
            "firmware": 57,
            "battery_percent": 80,
            "setpoint_away": { "setpoint_activate": false },
            "setpoint_manual": { "setpoint_activate": true },
            "measured": {
                "temperature": 25,
                "setpoint_temp": 26,
                "est_setpoint_temp": 27,
            },
        }],
    })
}

/// The typed decode of [`station_payload`].
pub fn station() -> Device {
    Device {
        id: Some("device-1".to_string()),
        device_type: Some("NAVaillant".to_string()),
        station_name: Some("Heating".to_string()),
        firmware: 19,
        system_mode: Some(SystemMode::Summer),
        setpoint_default_duration: 120,
        setpoint_hwb: Setpoint {
            setpoint_activate: false,
        },
        modules: vec![module()],
    }
}

/// The typed decode of the module inside [`station_payload`].
pub fn module() -> Module {
    Module {
        id: Some("module-1".to_string()),
        module_type: Some("NAThermVaillant".to_string()),
        module_name: Some("Living room".to_string()),
        firmware: 57,
        setpoint_away: Setpoint {
            setpoint_activate: false,
        },
        setpoint_manual: Setpoint {
            setpoint_activate: true,
        },
        measured: Measured {
            temperature: Some(25.0),
            setpoint_temp: Some(26.0),
            est_setpoint_temp: Some(27.0),
        },
    }
}
