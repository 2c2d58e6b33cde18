use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{Map, Value};
use soilmon_common::{FanControlRequest, FanStatus, SensorReading};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

const MISSING_FIELD: &str = "N/A";

#[derive(Clone, Default)]
pub struct BackendState {
    latest: Arc<Mutex<Option<SensorReading>>>,
    fan: Arc<Mutex<Option<FanStatus>>>,
}

impl BackendState {
    pub async fn store_reading(&self, reading: SensorReading) {
        *self.latest.lock().await = Some(reading);
    }

    pub async fn latest_reading(&self) -> Option<SensorReading> {
        self.latest.lock().await.clone()
    }

    pub async fn fan_status(&self) -> Option<FanStatus> {
        *self.fan.lock().await
    }
}

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("request body is empty")]
    Empty,
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("request body is not a json object")]
    NotObject,
}

#[derive(Debug, Serialize)]
struct MessageBody {
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct StatusBody {
    status: &'static str,
    message: &'static str,
}

pub fn router(state: BackendState) -> Router {
    Router::new()
        .route("/sensorData", get(handle_get_sensor_data))
        .route("/updateSensor", post(handle_update_sensor))
        .route("/fanControl", post(handle_fan_control))
        .with_state(state)
}

async fn handle_get_sensor_data(State(state): State<BackendState>) -> Response {
    match state.latest_reading().await {
        Some(reading) => Json(reading).into_response(),
        None => Json(MessageBody {
            message: "No data found.",
        })
        .into_response(),
    }
}

async fn handle_update_sensor(State(state): State<BackendState>, body: String) -> Response {
    match parse_sensor_update(&body) {
        Ok(reading) => {
            info!(
                "parsed data -> soil health: {}, water level: {}, temperature: {}, humidity: {}, pump status: {}",
                reading.soil_health,
                reading.water_level,
                reading.temperature,
                reading.humidity,
                reading.pump_status
            );
            state.store_reading(reading).await;
            status_response(StatusCode::OK, "success", "Data inserted successfully.")
        }
        Err(err) => {
            warn!("rejected sensor update: {err}");
            status_response(StatusCode::BAD_REQUEST, "error", "Invalid JSON format.")
        }
    }
}

async fn handle_fan_control(State(state): State<BackendState>, body: String) -> Response {
    match serde_json::from_str::<FanControlRequest>(&body) {
        Ok(request) => {
            info!("fan control -> {}", request.fan_status.as_str());
            *state.fan.lock().await = Some(request.fan_status);
            status_response(StatusCode::OK, "success", "Fan status updated.")
        }
        Err(err) => {
            warn!("rejected fan control: {err}");
            status_response(StatusCode::BAD_REQUEST, "error", "Invalid JSON format.")
        }
    }
}

pub fn parse_sensor_update(body: &str) -> Result<SensorReading, UpdateError> {
    if body.trim().is_empty() {
        return Err(UpdateError::Empty);
    }

    let value: Value = serde_json::from_str(body)?;
    let Value::Object(fields) = value else {
        return Err(UpdateError::NotObject);
    };

    Ok(SensorReading {
        soil_health: opt_string(&fields, "soil_health"),
        water_level: opt_string(&fields, "water_level"),
        temperature: opt_string(&fields, "temperature"),
        humidity: opt_string(&fields, "humidity"),
        pump_status: opt_string(&fields, "pump_status"),
    })
}

fn opt_string(fields: &Map<String, Value>, key: &str) -> String {
    match fields.get(key) {
        None | Some(Value::Null) => MISSING_FIELD.to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn status_response(status: StatusCode, outcome: &'static str, message: &'static str) -> Response {
    (
        status,
        Json(StatusBody {
            status: outcome,
            message,
        }),
    )
        .into_response()
}
