use serde::{Deserialize, Serialize};

pub const PUMP_STATUS_ON: &str = "on";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorReading {
    pub soil_health: String,
    pub water_level: String,
    pub temperature: String,
    pub humidity: String,
    pub pump_status: String,
}

impl SensorReading {
    pub fn is_pump_running(&self) -> bool {
        self.pump_status == PUMP_STATUS_ON
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanStatus {
    On,
    Off,
}

impl FanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "on" => Some(Self::On),
            "off" => Some(Self::Off),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanControlRequest {
    pub fan_status: FanStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActuatorState {
    #[serde(rename = "fanOn")]
    pub fan_on: bool,
    #[serde(rename = "pumpOn")]
    pub pump_on: bool,
}

impl ActuatorState {
    pub fn is_active(self, alert: Alert) -> bool {
        match alert {
            Alert::Fan => self.fan_on,
            Alert::Pump => self.pump_on,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alert {
    Fan,
    Pump,
}

impl Alert {
    pub const ALL: [Alert; 2] = [Alert::Fan, Alert::Pump];

    pub fn message(self) -> &'static str {
        match self {
            Self::Fan => "⚠️ Fan is working",
            Self::Pump => "💧 Water is adding",
        }
    }
}
