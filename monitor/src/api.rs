use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use soilmon_common::{FanControlRequest, FanStatus, MonitorSnapshot};
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

use crate::{blink::AlertBlinkers, port::DataPort, view::DashboardView};

pub struct ApiState<P> {
    snapshots: watch::Receiver<MonitorSnapshot>,
    blinkers: Arc<Mutex<AlertBlinkers>>,
    port: Arc<P>,
}

impl<P> Clone for ApiState<P> {
    fn clone(&self) -> Self {
        Self {
            snapshots: self.snapshots.clone(),
            blinkers: self.blinkers.clone(),
            port: self.port.clone(),
        }
    }
}

impl<P> ApiState<P> {
    pub fn new(
        snapshots: watch::Receiver<MonitorSnapshot>,
        blinkers: Arc<Mutex<AlertBlinkers>>,
        port: Arc<P>,
    ) -> Self {
        Self {
            snapshots,
            blinkers,
            port,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct FanControlResponse {
    #[serde(rename = "fanStatus")]
    fan_status: FanStatus,
}

pub fn router<P: DataPort>(state: ApiState<P>) -> Router {
    Router::new()
        .route("/api/status", get(handle_get_status::<P>))
        .route("/api/snapshot", get(handle_get_snapshot::<P>))
        .route("/api/fan", post(handle_set_fan::<P>))
        .with_state(state)
}

async fn handle_get_status<P: DataPort>(State(state): State<ApiState<P>>) -> impl IntoResponse {
    let snapshot = state.snapshots.borrow().clone();
    let blinkers = state.blinkers.lock().await;
    Json(DashboardView::build(&snapshot, |alert| {
        blinkers.visibility(alert)
    }))
}

async fn handle_get_snapshot<P: DataPort>(
    State(state): State<ApiState<P>>,
) -> impl IntoResponse {
    let snapshot = state.snapshots.borrow().clone();
    Json(snapshot)
}

async fn handle_set_fan<P: DataPort>(
    State(state): State<ApiState<P>>,
    Query(params): Query<HashMap<String, String>>,
) -> axum::response::Response {
    let Some(value) = params.get("value") else {
        return error_response(StatusCode::BAD_REQUEST, "Missing 'value' parameter");
    };
    let Some(fan_status) = FanStatus::parse(value) else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid fan status. Use 'on' or 'off'");
    };

    match state.port.control_fan(FanControlRequest { fan_status }).await {
        Ok(()) => {
            info!("fan control sent: {}", fan_status.as_str());
            Json(FanControlResponse { fan_status }).into_response()
        }
        Err(err) => {
            warn!("fan control failed: {err:?}");
            error_response(StatusCode::BAD_GATEWAY, &err.to_string())
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> axum::response::Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}
