use std::time::Duration;

use soilmon_common::SensorReading;
use tracing::debug;

use crate::server::BackendState;

pub fn simulated_reading(tick: u64) -> SensorReading {
    let temperature = 30 + (tick % 8);
    let water_level = 40u64.saturating_sub((tick % 6) * 6);
    let soil_health = 55 + (tick % 5) * 3;
    let humidity = 42.0 + ((tick % 6) as f32 * 0.5);

    SensorReading {
        soil_health: soil_health.to_string(),
        water_level: water_level.to_string(),
        temperature: format!("{temperature}°C"),
        humidity: format!("{humidity:.1}"),
        pump_status: if water_level < 20 { "on" } else { "off" }.to_string(),
    }
}

pub async fn run_simulation(state: BackendState, period: Duration) {
    let mut tick: u64 = 0;
    let mut interval = tokio::time::interval(period);

    loop {
        interval.tick().await;
        tick = tick.saturating_add(1);

        let reading = simulated_reading(tick);
        debug!("simulated reading: {reading:?}");
        state.store_reading(reading).await;
    }
}

#[cfg(test)]
mod tests {
    use soilmon_common::{ActuatorState, ThresholdEngine};

    use super::*;

    #[test]
    fn sweep_crosses_both_thresholds() {
        let engine = ThresholdEngine::default();
        let mut state = ActuatorState::default();
        let mut saw_fan = false;
        let mut saw_low_water = false;
        let mut saw_pump = false;

        for tick in 0..48 {
            let derived = engine.derive(state, &simulated_reading(tick));
            saw_fan |= derived.actuators.fan_on;
            saw_pump |= derived.actuators.pump_on;
            saw_low_water |= derived.low_water;
            state = derived.actuators;
        }

        assert!(saw_fan && saw_pump && saw_low_water);
    }

    #[tokio::test(start_paused = true)]
    async fn simulation_publishes_readings() {
        let state = BackendState::default();
        let handle = tokio::spawn(run_simulation(state.clone(), Duration::from_secs(5)));

        tokio::time::sleep(Duration::from_secs(11)).await;
        handle.abort();

        assert_eq!(state.latest_reading().await, Some(simulated_reading(3)));
    }
}
