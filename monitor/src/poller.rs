use std::{sync::Arc, time::Duration};

use chrono::Utc;
use soilmon_common::{FanTransition, MonitorSnapshot, ThresholdEngine};
use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::port::DataPort;

pub struct Poller<P> {
    port: Arc<P>,
    engine: ThresholdEngine,
    interval: Duration,
    state: watch::Sender<MonitorSnapshot>,
}

impl<P: DataPort> Poller<P> {
    pub fn new(
        port: Arc<P>,
        engine: ThresholdEngine,
        interval: Duration,
        state: watch::Sender<MonitorSnapshot>,
    ) -> Self {
        Self {
            port,
            engine,
            interval,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<MonitorSnapshot> {
        self.state.subscribe()
    }

    pub async fn poll_once(&self) -> bool {
        let outcome = self.port.fetch_sensor_data().await;

        match &outcome {
            Ok(reading) => {
                info!("received sensor data: {reading:?}");
                debug!("pump status: {}", reading.pump_status);
            }
            Err(err) => warn!("error fetching data: {err} ({err:?})"),
        }

        let succeeded = outcome.is_ok();
        let mut transition = None;
        self.state.send_modify(|snapshot| {
            transition = snapshot.apply(&self.engine, outcome, Utc::now());
        });

        let threshold = self.engine.config().fan_on_temp_c;
        match transition {
            Some(FanTransition::TurnedOn) => {
                info!("fan turned on due to temperature >= {threshold}°C")
            }
            Some(FanTransition::TurnedOff) => {
                info!("fan turned off due to temperature < {threshold}°C")
            }
            None => {}
        }

        succeeded
    }

    pub async fn run_loop(self, cancel: CancellationToken) {
        info!(
            "sensor poller started (interval {} ms)",
            self.interval.as_millis()
        );

        while !cancel.is_cancelled() {
            self.poll_once().await;

            // Cancellation is only observed here, never mid-fetch.
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!("sensor poller stopped");
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run_loop(cancel))
    }
}
