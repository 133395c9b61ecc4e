//! Thermostat mode enumerations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Major operating mode of the installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemMode {
    /// Heating and hot water
    Winter,
    /// Hot water only
    Summer,
    /// Frost protection only
    Frostguard,
}

impl SystemMode {
    /// Wire value of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemMode::Winter => "winter",
            SystemMode::Summer => "summer",
            SystemMode::Frostguard => "frostguard",
        }
    }
}

impl fmt::Display for SystemMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Temporary override applied on top of the system mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetpointMode {
    /// Hold a caller-chosen temperature until an end time
    Manual,
    /// Away / reduced heating
    Away,
    /// Hot water boost
    Hwb,
}

impl SetpointMode {
    /// Wire value of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            SetpointMode::Manual => "manual",
            SetpointMode::Away => "away",
            SetpointMode::Hwb => "hwb",
        }
    }
}

impl fmt::Display for SetpointMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
