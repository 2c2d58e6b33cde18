use std::{future::Future, time::Duration};

use anyhow::Context;
use reqwest::{Client, Response, Url};
use serde::Serialize;
use soilmon_common::{DataPortConfig, FanControlRequest, FetchError, FetchOutcome, SensorReading};

pub const SENSOR_DATA_PATH: &str = "sensorData";
pub const UPDATE_SENSOR_PATH: &str = "updateSensor";
pub const FAN_CONTROL_PATH: &str = "fanControl";

pub trait DataPort: Send + Sync + 'static {
    fn fetch_sensor_data(&self) -> impl Future<Output = FetchOutcome> + Send;

    fn update_sensor_data(
        &self,
        reading: &SensorReading,
    ) -> impl Future<Output = Result<(), FetchError>> + Send;

    fn control_fan(
        &self,
        request: FanControlRequest,
    ) -> impl Future<Output = Result<(), FetchError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpDataPort {
    client: Client,
    base_url: Url,
}

impl HttpDataPort {
    pub fn new(config: &DataPortConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("invalid data port base url {:?}", config.base_url))?;
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .context("failed to build data port http client")?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path)
            .map_err(|err| FetchError::transport(format!("invalid endpoint {path}: {err}")))
    }

    async fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<(), FetchError> {
        let url = self.endpoint(path)?;
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response).map(|_| ())
    }
}

impl DataPort for HttpDataPort {
    async fn fetch_sensor_data(&self) -> FetchOutcome {
        let url = self.endpoint(SENSOR_DATA_PATH)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(transport_error)?;

        check_status(response)?
            .json::<SensorReading>()
            .await
            .map_err(|err| FetchError::decode(err.to_string()))
    }

    async fn update_sensor_data(&self, reading: &SensorReading) -> Result<(), FetchError> {
        self.post_json(UPDATE_SENSOR_PATH, reading).await
    }

    async fn control_fan(&self, request: FanControlRequest) -> Result<(), FetchError> {
        self.post_json(FAN_CONTROL_PATH, &request).await
    }
}

fn check_status(response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(FetchError::Server {
            status: status.as_u16(),
        })
    }
}

fn transport_error(err: reqwest::Error) -> FetchError {
    FetchError::transport(err.to_string())
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, routing::get, Router};
    use soilmon_backend::server::{router, BackendState};
    use soilmon_common::FanStatus;
    use tokio::net::TcpListener;

    use super::*;

    fn sample_reading() -> SensorReading {
        SensorReading {
            soil_health: "64".to_string(),
            water_level: "12".to_string(),
            temperature: "35°C".to_string(),
            humidity: "70".to_string(),
            pump_status: "on".to_string(),
        }
    }

    async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    fn port_for(base_url: String) -> HttpDataPort {
        HttpDataPort::new(&DataPortConfig {
            base_url,
            connect_timeout_ms: 2_000,
            request_timeout_ms: 2_000,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn fetches_latest_reading_from_backend() {
        let state = BackendState::default();
        state.store_reading(sample_reading()).await;
        let port = port_for(serve(router(state)).await);

        let reading = port.fetch_sensor_data().await.unwrap();

        assert_eq!(reading, sample_reading());
    }

    #[tokio::test]
    async fn non_success_status_is_a_server_failure() {
        let app = Router::new().route(
            "/sensorData",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let port = port_for(serve(app).await);

        let err = port.fetch_sensor_data().await.unwrap_err();

        assert_eq!(err, FetchError::Server { status: 500 });
        assert_eq!(err.to_string(), "Failed to fetch data");
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let port = port_for(format!("http://{addr}/"));

        let err = port.fetch_sensor_data().await.unwrap_err();

        assert!(matches!(err, FetchError::Transport(_)), "{err:?}");
    }

    #[tokio::test]
    async fn empty_backend_body_fails_to_decode() {
        let port = port_for(serve(router(BackendState::default())).await);

        let err = port.fetch_sensor_data().await.unwrap_err();

        assert!(matches!(err, FetchError::Decode(_)), "{err:?}");
    }

    #[tokio::test]
    async fn control_calls_reach_the_backend() {
        let state = BackendState::default();
        let port = port_for(serve(router(state.clone())).await);

        port.update_sensor_data(&sample_reading()).await.unwrap();
        port.control_fan(FanControlRequest {
            fan_status: FanStatus::On,
        })
        .await
        .unwrap();

        assert_eq!(state.latest_reading().await, Some(sample_reading()));
        assert_eq!(state.fan_status().await, Some(FanStatus::On));
    }

    #[test]
    fn base_path_is_kept_when_joining_endpoints() {
        let port = port_for("http://10.1.1.4:8080/soil/".to_string());

        let url = port.endpoint(SENSOR_DATA_PATH).unwrap();

        assert_eq!(url.as_str(), "http://10.1.1.4:8080/soil/sensorData");
    }
}
