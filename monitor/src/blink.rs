use std::{sync::Arc, time::Duration};

use soilmon_common::{ActuatorState, Alert, BlinkSequence, MonitorSnapshot};
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub struct BlinkTimer {
    alert: Alert,
    visible: watch::Receiver<bool>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl BlinkTimer {
    pub fn start(alert: Alert, period: Duration, parent: &CancellationToken) -> Self {
        let cancel = parent.child_token();
        let (tx, visible) = watch::channel(true);
        let handle = tokio::spawn(blink_loop(period, tx, cancel.clone()));

        Self {
            alert,
            visible,
            cancel,
            handle,
        }
    }

    pub fn alert(&self) -> Alert {
        self.alert
    }

    pub fn is_visible(&self) -> bool {
        *self.visible.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.visible.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for BlinkTimer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn blink_loop(period: Duration, tx: watch::Sender<bool>, cancel: CancellationToken) {
    for visible in BlinkSequence::default() {
        tx.send_replace(visible);

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(period) => {}
        }
    }
}

pub struct AlertBlinkers {
    period: Duration,
    cancel: CancellationToken,
    fan: Option<BlinkTimer>,
    pump: Option<BlinkTimer>,
}

impl AlertBlinkers {
    pub fn new(period: Duration, cancel: CancellationToken) -> Self {
        Self {
            period,
            cancel,
            fan: None,
            pump: None,
        }
    }

    pub fn sync(&mut self, actuators: ActuatorState) -> bool {
        let mut changed = false;

        for alert in Alert::ALL {
            let active = actuators.is_active(alert) && !self.cancel.is_cancelled();
            let period = self.period;
            let parent = self.cancel.clone();
            let slot = self.slot_mut(alert);

            match (active, slot.is_some()) {
                (true, false) => {
                    debug!("starting {alert:?} alert blink");
                    *slot = Some(BlinkTimer::start(alert, period, &parent));
                    changed = true;
                }
                (false, true) => {
                    debug!("stopping {alert:?} alert blink");
                    *slot = None;
                    changed = true;
                }
                _ => {}
            }
        }

        changed
    }

    pub fn visibility(&self, alert: Alert) -> Option<bool> {
        self.slot(alert).as_ref().map(BlinkTimer::is_visible)
    }

    pub fn is_blinking(&self, alert: Alert) -> bool {
        self.slot(alert).is_some()
    }

    fn slot(&self, alert: Alert) -> &Option<BlinkTimer> {
        match alert {
            Alert::Fan => &self.fan,
            Alert::Pump => &self.pump,
        }
    }

    fn slot_mut(&mut self, alert: Alert) -> &mut Option<BlinkTimer> {
        match alert {
            Alert::Fan => &mut self.fan,
            Alert::Pump => &mut self.pump,
        }
    }
}

pub async fn supervise_alerts(
    blinkers: Arc<Mutex<AlertBlinkers>>,
    mut snapshots: watch::Receiver<MonitorSnapshot>,
    cancel: CancellationToken,
) {
    loop {
        let actuators = snapshots.borrow_and_update().actuators;
        blinkers.lock().await.sync(actuators);

        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    blinkers.lock().await.sync(ActuatorState::default());
    debug!("alert supervisor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_millis(500);

    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    fn actuators(fan_on: bool, pump_on: bool) -> ActuatorState {
        ActuatorState { fan_on, pump_on }
    }

    #[tokio::test(start_paused = true)]
    async fn toggles_once_per_period_starting_visible() {
        let cancel = CancellationToken::new();
        let timer = BlinkTimer::start(Alert::Fan, PERIOD, &cancel);
        settle().await;

        let mut observed = vec![timer.is_visible()];
        for _ in 0..5 {
            tokio::time::sleep(PERIOD).await;
            settle().await;
            observed.push(timer.is_visible());
        }

        assert_eq!(observed, vec![true, false, true, false, true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn visibility_holds_between_ticks() {
        let cancel = CancellationToken::new();
        let timer = BlinkTimer::start(Alert::Pump, PERIOD, &cancel);
        settle().await;

        tokio::time::sleep(Duration::from_millis(499)).await;
        settle().await;
        assert!(timer.is_visible());

        tokio::time::sleep(Duration::from_millis(2)).await;
        settle().await;
        assert!(!timer.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_timer_stops_its_task() {
        let cancel = CancellationToken::new();
        let timer = BlinkTimer::start(Alert::Fan, PERIOD, &cancel);
        let token = timer.cancel.clone();
        let mut rx = timer.subscribe();
        settle().await;

        drop(timer);
        settle().await;

        assert!(token.is_cancelled());
        rx.borrow_and_update();
        tokio::time::sleep(PERIOD * 4).await;
        assert!(!rx.has_changed().unwrap_or(false));
    }

    #[tokio::test(start_paused = true)]
    async fn parent_cancel_stops_timer() {
        let cancel = CancellationToken::new();
        let timer = BlinkTimer::start(Alert::Fan, PERIOD, &cancel);
        settle().await;

        cancel.cancel();
        settle().await;

        assert!(timer.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn blinkers_follow_actuator_state() {
        let mut blinkers = AlertBlinkers::new(PERIOD, CancellationToken::new());

        assert!(blinkers.sync(actuators(true, false)));
        assert_eq!(blinkers.fan.as_ref().map(BlinkTimer::alert), Some(Alert::Fan));
        assert!(!blinkers.is_blinking(Alert::Pump));
        assert!(!blinkers.sync(actuators(true, false)));

        assert!(blinkers.sync(actuators(false, true)));
        assert!(!blinkers.is_blinking(Alert::Fan));
        assert_eq!(blinkers.visibility(Alert::Fan), None);
        assert!(blinkers.is_blinking(Alert::Pump));
    }

    #[tokio::test(start_paused = true)]
    async fn reactivated_alert_restarts_visible() {
        let mut blinkers = AlertBlinkers::new(PERIOD, CancellationToken::new());
        blinkers.sync(actuators(true, false));
        settle().await;
        tokio::time::sleep(PERIOD).await;
        settle().await;
        assert_eq!(blinkers.visibility(Alert::Fan), Some(false));

        blinkers.sync(actuators(false, false));
        blinkers.sync(actuators(true, false));
        settle().await;

        assert_eq!(blinkers.visibility(Alert::Fan), Some(true));
    }

    #[tokio::test(start_paused = true)]
    async fn supervisor_tracks_published_snapshots() {
        let cancel = CancellationToken::new();
        let blinkers = Arc::new(Mutex::new(AlertBlinkers::new(PERIOD, cancel.clone())));
        let (tx, rx) = watch::channel(MonitorSnapshot::default());
        let handle = tokio::spawn(supervise_alerts(blinkers.clone(), rx, cancel.clone()));
        settle().await;
        assert!(!blinkers.lock().await.is_blinking(Alert::Pump));

        tx.send_modify(|snapshot| snapshot.actuators = actuators(false, true));
        settle().await;
        assert!(blinkers.lock().await.is_blinking(Alert::Pump));

        tx.send_modify(|snapshot| snapshot.actuators = actuators(false, false));
        settle().await;
        assert!(!blinkers.lock().await.is_blinking(Alert::Pump));

        tx.send_modify(|snapshot| snapshot.actuators = actuators(true, true));
        settle().await;
        cancel.cancel();
        handle.await.unwrap();

        let blinkers = blinkers.lock().await;
        assert!(!blinkers.is_blinking(Alert::Fan));
        assert!(!blinkers.is_blinking(Alert::Pump));
    }
}
