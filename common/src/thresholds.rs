use crate::{
    config::ThresholdConfig,
    error::ParseError,
    types::{ActuatorState, SensorReading},
};

pub const TEMPERATURE_UNIT: &str = "°C";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanTransition {
    TurnedOn,
    TurnedOff,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derivation {
    pub actuators: ActuatorState,
    pub low_water: bool,
    pub fan_transition: Option<FanTransition>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdEngine {
    config: ThresholdConfig,
}

impl Default for ThresholdEngine {
    fn default() -> Self {
        Self::new(ThresholdConfig::default())
    }
}

impl ThresholdEngine {
    pub fn new(config: ThresholdConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    pub fn derive(&self, previous: ActuatorState, reading: &SensorReading) -> Derivation {
        let temperature = parse_temperature(&reading.temperature).ok();
        let (fan_on, fan_transition) = self.next_fan_state(previous.fan_on, temperature);

        Derivation {
            actuators: ActuatorState {
                fan_on,
                pump_on: reading.is_pump_running(),
            },
            low_water: self.is_low_water(water_level_or_zero(&reading.water_level)),
            fan_transition,
        }
    }

    pub fn next_fan_state(
        &self,
        fan_on: bool,
        temperature_c: Option<f32>,
    ) -> (bool, Option<FanTransition>) {
        let Some(temp) = temperature_c else {
            return (fan_on, None);
        };

        let threshold = self.config.fan_on_temp_c;
        if temp >= threshold && !fan_on {
            (true, Some(FanTransition::TurnedOn))
        } else if temp < threshold && fan_on {
            (false, Some(FanTransition::TurnedOff))
        } else {
            (fan_on, None)
        }
    }

    pub fn is_low_water(&self, water_level: f32) -> bool {
        water_level < self.config.low_water_percent
    }
}

pub fn parse_temperature(text: &str) -> Result<f32, ParseError> {
    text.replace(TEMPERATURE_UNIT, "")
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ParseError::Temperature(text.to_string()))
}

pub fn parse_water_level(text: &str) -> Result<f32, ParseError> {
    text.trim()
        .parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ParseError::WaterLevel(text.to_string()))
}

pub fn water_level_or_zero(text: &str) -> f32 {
    parse_water_level(text).unwrap_or(0.0)
}
