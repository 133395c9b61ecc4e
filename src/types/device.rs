//! Device and module payload types.
//!
//! Decoded from the `getthermostatsdata` body. Fields the vendor omits fall
//! back to defaults, and unknown fields are ignored, so payload growth on
//! the vendor side never breaks decoding.

use serde::{Deserialize, Serialize};

use super::SystemMode;

/// Default manual-setpoint duration when the payload omits it, in minutes.
fn default_setpoint_duration() -> i64 {
    120
}

/// A thermostat station (the boiler-attached relay).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Device identifier
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    /// Vendor device type, `NAVaillant` for this API
    #[serde(rename = "type", default)]
    pub device_type: Option<String>,
    /// User-visible station name
    #[serde(default)]
    pub station_name: Option<String>,
    /// Firmware revision
    #[serde(default)]
    pub firmware: i64,
    /// Current system mode
    #[serde(default)]
    pub system_mode: Option<SystemMode>,
    /// Duration applied to manual setpoints without an explicit end time,
    /// in minutes
    #[serde(default = "default_setpoint_duration")]
    pub setpoint_default_duration: i64,
    /// Hot-water-boost setpoint state
    #[serde(default)]
    pub setpoint_hwb: Setpoint,
    /// Thermostat modules attached to this station
    #[serde(default)]
    pub modules: Vec<Module>,
}

/// A thermostat module attached to a station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// Module identifier
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    /// Vendor module type
    #[serde(rename = "type", default)]
    pub module_type: Option<String>,
    /// User-visible module name
    #[serde(default)]
    pub module_name: Option<String>,
    /// Firmware revision
    #[serde(default)]
    pub firmware: i64,
    /// Away setpoint state
    #[serde(default)]
    pub setpoint_away: Setpoint,
    /// Manual setpoint state
    #[serde(default)]
    pub setpoint_manual: Setpoint,
    /// Latest measurements
    #[serde(default)]
    pub measured: Measured,
}

/// Activation state of one setpoint mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Setpoint {
    /// Whether the mode is currently active
    #[serde(default)]
    pub setpoint_activate: bool,
}

/// Latest measurements reported by a module.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Measured {
    /// Measured room temperature, degrees Celsius
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Active target temperature
    #[serde(default)]
    pub setpoint_temp: Option<f64>,
    /// Estimated achievable temperature
    #[serde(default)]
    pub est_setpoint_temp: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_payload_decodes_with_modules() {
        let device: Device = serde_json::from_value(serde_json::json!({
            "_id": "device-1",
            "type": "NAVaillant",
            "station_name": "Heating",
            "firmware": 19,
            "system_mode": "summer",
            "setpoint_default_duration": 120,
            "setpoint_hwb": {"setpoint_activate": false},
            "modules": [{
                "_id": "module-1",
                "type": "NAThermVaillant",
                "module_name": "Living room",
                "firmware": 57,
                "battery_percent": 80,
                "setpoint_away": {"setpoint_activate": false},
                "setpoint_manual": {"setpoint_activate": true},
                "measured": {
                    "temperature": 25,
                    "setpoint_temp": 26,
                    "est_setpoint_temp": 27
                }
            }]
        }))
        .unwrap();

        assert_eq!(device.id.as_deref(), Some("device-1"));
        assert_eq!(device.system_mode, Some(SystemMode::Summer));
        assert_eq!(device.setpoint_default_duration, 120);
        assert!(!device.setpoint_hwb.setpoint_activate);

        let module = &device.modules[0];
        assert_eq!(module.id.as_deref(), Some("module-1"));
        assert!(module.setpoint_manual.setpoint_activate);
        assert_eq!(module.measured.temperature, Some(25.0));
        assert_eq!(module.measured.est_setpoint_temp, Some(27.0));
    }

    #[test]
    fn sparse_payloads_fall_back_to_defaults() {
        let device: Device = serde_json::from_value(serde_json::json!({})).unwrap();

        assert_eq!(device.id, None);
        assert_eq!(device.system_mode, None);
        assert_eq!(device.setpoint_default_duration, 120);
        assert!(device.modules.is_empty());
    }
}
