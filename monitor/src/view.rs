use chrono::{DateTime, Utc};
use serde::Serialize;
use soilmon_common::{thresholds::TEMPERATURE_UNIT, Alert, BlinkState, MonitorSnapshot};

pub const TITLE: &str = "Soil Health Monitoring APP";
pub const LOADING: &str = "Loading...";
pub const LOW_WATER_WARNING: &str =
    "⚠️ Water reservoir is low! Go to the tank to dump and refill water.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertView {
    pub alert: Alert,
    pub message: &'static str,
    pub visible: bool,
    pub alpha: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub rows: Vec<StatusRow>,
    #[serde(rename = "lowWaterWarning", skip_serializing_if = "Option::is_none")]
    pub low_water_warning: Option<&'static str>,
    pub alerts: Vec<AlertView>,
    #[serde(rename = "lastUpdated")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl DashboardView {
    pub fn build<F>(snapshot: &MonitorSnapshot, visibility: F) -> Self
    where
        F: Fn(Alert) -> Option<bool>,
    {
        if snapshot.has_error() {
            return Self {
                title: TITLE,
                error: Some(format!("Error: {}", snapshot.error_message)),
                rows: Vec::new(),
                low_water_warning: None,
                alerts: Vec::new(),
                last_updated: snapshot.last_updated,
            };
        }

        let rows = match &snapshot.reading {
            Some(reading) => vec![
                row("Soil Health", &reading.soil_health, "%"),
                row("Water Level", &reading.water_level, "%"),
                row("Temperature", &reading.temperature, TEMPERATURE_UNIT),
                row("Humidity", &reading.humidity, "%"),
            ],
            None => ["Soil Health", "Water Level", "Temperature", "Humidity"]
                .into_iter()
                .map(|label| StatusRow {
                    label,
                    value: LOADING.to_string(),
                })
                .collect(),
        };

        let alerts = Alert::ALL
            .into_iter()
            .filter(|alert| snapshot.actuators.is_active(*alert))
            .map(|alert| {
                let blink = BlinkState {
                    visible: visibility(alert).unwrap_or(true),
                };
                AlertView {
                    alert,
                    message: alert.message(),
                    visible: blink.visible,
                    alpha: blink.alpha(),
                }
            })
            .collect();

        Self {
            title: TITLE,
            error: None,
            rows,
            low_water_warning: snapshot.low_water.then_some(LOW_WATER_WARNING),
            alerts,
            last_updated: snapshot.last_updated,
        }
    }
}

fn row(label: &'static str, value: &str, unit: &str) -> StatusRow {
    let value = if value.ends_with(unit) {
        value.to_string()
    } else {
        format!("{value}{unit}")
    };
    StatusRow { label, value }
}
