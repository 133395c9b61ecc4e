//! Request types for thermostat operations.

use chrono::{DateTime, Utc};

use crate::errors::{NetatmoError, NetatmoResult};
use crate::types::{SetpointMode, SystemMode};

/// Vendor device type selecting Vaillant hardware.
pub(crate) const VAILLANT_DEVICE_TYPE: &str = "NAVaillant";

/// Fetch every thermostat station and its modules.
#[derive(Debug, Clone)]
pub struct GetThermostatsDataRequest {
    /// Vendor device type filter
    pub device_type: String,
}

impl Default for GetThermostatsDataRequest {
    fn default() -> Self {
        Self {
            device_type: VAILLANT_DEVICE_TYPE.to_string(),
        }
    }
}

impl GetThermostatsDataRequest {
    pub(crate) fn to_fields(&self) -> Vec<(String, String)> {
        vec![("device_type".to_string(), self.device_type.clone())]
    }
}

/// Switch a device's system mode.
#[derive(Debug, Clone)]
pub struct SetSystemModeRequest {
    /// Target station
    pub device_id: String,
    /// Target module
    pub module_id: String,
    /// Mode to switch to
    pub system_mode: SystemMode,
}

impl SetSystemModeRequest {
    /// Create a request.
    pub fn new(
        device_id: impl Into<String>,
        module_id: impl Into<String>,
        system_mode: SystemMode,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            module_id: module_id.into(),
            system_mode,
        }
    }

    pub(crate) fn validate(&self) -> NetatmoResult<()> {
        if self.device_id.is_empty() || self.module_id.is_empty() {
            return Err(NetatmoError::invalid_argument(
                "device_id and module_id must not be empty",
            ));
        }
        Ok(())
    }

    pub(crate) fn to_fields(&self) -> Vec<(String, String)> {
        vec![
            ("device_id".to_string(), self.device_id.clone()),
            ("module_id".to_string(), self.module_id.clone()),
            ("system_mode".to_string(), self.system_mode.to_string()),
        ]
    }
}

/// Activate or deactivate a minor mode.
///
/// The vendor accepts a different field combination per mode and direction:
/// activating manual mode takes a temperature and an end time, both
/// mandatory; activating hot water boost takes a mandatory end time and no
/// temperature; activating away mode takes an optional end time and no
/// temperature; deactivation never takes either. End times must lie in the
/// future. [`SetMinorModeRequest::validate`] enforces all of this before any
/// bytes go on the wire.
#[derive(Debug, Clone)]
pub struct SetMinorModeRequest {
    /// Target station
    pub device_id: String,
    /// Target module
    pub module_id: String,
    /// Minor mode to change
    pub setpoint_mode: SetpointMode,
    /// `true` to activate, `false` to deactivate
    pub activate: bool,
    /// When the override ends; sent as rounded epoch seconds
    pub setpoint_endtime: Option<DateTime<Utc>>,
    /// Target temperature, manual mode only
    pub setpoint_temp: Option<f64>,
}

impl SetMinorModeRequest {
    /// Create a request with no end time or temperature.
    pub fn new(
        device_id: impl Into<String>,
        module_id: impl Into<String>,
        setpoint_mode: SetpointMode,
        activate: bool,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            module_id: module_id.into(),
            setpoint_mode,
            activate,
            setpoint_endtime: None,
            setpoint_temp: None,
        }
    }

    /// Set when the override ends.
    pub fn setpoint_endtime(mut self, endtime: DateTime<Utc>) -> Self {
        self.setpoint_endtime = Some(endtime);
        self
    }

    /// Set the target temperature.
    pub fn setpoint_temp(mut self, temp: f64) -> Self {
        self.setpoint_temp = Some(temp);
        self
    }

    /// Enforce the vendor's accepted field combinations.
    pub(crate) fn validate(&self, now: DateTime<Utc>) -> NetatmoResult<()> {
        if self.device_id.is_empty() || self.module_id.is_empty() {
            return Err(NetatmoError::invalid_argument(
                "device_id and module_id must not be empty",
            ));
        }

        if let Some(endtime) = self.setpoint_endtime {
            if endtime <= now {
                return Err(NetatmoError::invalid_argument(
                    "setpoint_endtime must lie in the future",
                ));
            }
        }

        if !self.activate {
            if self.setpoint_temp.is_some() || self.setpoint_endtime.is_some() {
                return Err(NetatmoError::invalid_argument(
                    "deactivation takes neither setpoint_temp nor setpoint_endtime",
                ));
            }
            return Ok(());
        }

        match self.setpoint_mode {
            SetpointMode::Manual => {
                if self.setpoint_temp.is_none() || self.setpoint_endtime.is_none() {
                    return Err(NetatmoError::invalid_argument(
                        "activating manual mode requires setpoint_temp and setpoint_endtime",
                    ));
                }
            }
            SetpointMode::Away => {
                if self.setpoint_temp.is_some() {
                    return Err(NetatmoError::invalid_argument(
                        "away mode does not take a setpoint_temp",
                    ));
                }
            }
            SetpointMode::Hwb => {
                if self.setpoint_temp.is_some() {
                    return Err(NetatmoError::invalid_argument(
                        "hot water boost does not take a setpoint_temp",
                    ));
                }
                if self.setpoint_endtime.is_none() {
                    return Err(NetatmoError::invalid_argument(
                        "activating hot water boost requires setpoint_endtime",
                    ));
                }
            }
        }

        Ok(())
    }

    pub(crate) fn to_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("device_id".to_string(), self.device_id.clone()),
            ("module_id".to_string(), self.module_id.clone()),
            ("setpoint_mode".to_string(), self.setpoint_mode.to_string()),
            ("activate".to_string(), self.activate.to_string()),
        ];

        if let Some(endtime) = self.setpoint_endtime {
            fields.push((
                "setpoint_endtime".to_string(),
                rounded_epoch(endtime).to_string(),
            ));
        }
        if let Some(temp) = self.setpoint_temp {
            fields.push(("setpoint_temp".to_string(), temp.to_string()));
        }

        fields
    }
}

/// Epoch seconds, rounded to the nearest second.
fn rounded_epoch(at: DateTime<Utc>) -> i64 {
    (at.timestamp_millis() as f64 / 1000.0).round() as i64
}
