use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    error::FetchOutcome,
    thresholds::{FanTransition, ThresholdEngine},
    types::{ActuatorState, SensorReading},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonitorSnapshot {
    pub reading: Option<SensorReading>,
    pub actuators: ActuatorState,
    #[serde(rename = "lowWater")]
    pub low_water: bool,
    #[serde(rename = "errorMessage")]
    pub error_message: String,
    #[serde(rename = "lastUpdated")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(rename = "successCount")]
    pub success_count: u64,
    #[serde(rename = "failureCount")]
    pub failure_count: u64,
}

impl MonitorSnapshot {
    pub fn apply(
        &mut self,
        engine: &ThresholdEngine,
        outcome: FetchOutcome,
        now: DateTime<Utc>,
    ) -> Option<FanTransition> {
        match outcome {
            Ok(reading) => {
                let derived = engine.derive(self.actuators, &reading);
                self.actuators = derived.actuators;
                self.low_water = derived.low_water;
                self.reading = Some(reading);
                self.error_message.clear();
                self.last_updated = Some(now);
                self.success_count = self.success_count.saturating_add(1);
                derived.fan_transition
            }
            Err(err) => {
                // Last good reading and actuator state stay published.
                self.error_message = err.to_string();
                self.failure_count = self.failure_count.saturating_add(1);
                None
            }
        }
    }

    pub fn has_error(&self) -> bool {
        !self.error_message.is_empty()
    }
}
