pub mod blink;
pub mod config;
pub mod error;
pub mod snapshot;
pub mod thresholds;
pub mod types;

pub use blink::{BlinkSequence, BlinkState};
pub use config::{DataPortConfig, MonitorConfig, ThresholdConfig, TimingConfig};
pub use error::{FetchError, FetchOutcome, ParseError};
pub use snapshot::MonitorSnapshot;
pub use thresholds::{Derivation, FanTransition, ThresholdEngine};
pub use types::{ActuatorState, Alert, FanControlRequest, FanStatus, SensorReading};
