use std::{io::ErrorKind, net::SocketAddr, path::Path, sync::Arc, time::Duration};

use anyhow::Context;
use soilmon_common::{MonitorConfig, MonitorSnapshot, ThresholdEngine};
use tokio::{
    net::TcpListener,
    sync::{watch, Mutex},
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    api::{self, ApiState},
    blink::{supervise_alerts, AlertBlinkers},
    poller::Poller,
    port::HttpDataPort,
};

pub const ENV_CONFIG_PATH: &str = "SOIL_MONITOR_CONFIG";

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = load_config().await;
    let port = Arc::new(HttpDataPort::new(&config.data_port)?);
    info!(
        "polling {} every {} ms",
        port.base_url(),
        config.timing.poll_interval_ms
    );

    let (state_tx, state_rx) = watch::channel(MonitorSnapshot::default());
    let cancel = CancellationToken::new();

    let poller = Poller::new(
        port.clone(),
        ThresholdEngine::new(config.thresholds),
        Duration::from_millis(config.timing.poll_interval_ms),
        state_tx,
    );
    let poller_handle = poller.spawn(cancel.clone());

    let blinkers = Arc::new(Mutex::new(AlertBlinkers::new(
        Duration::from_millis(config.timing.blink_interval_ms),
        cancel.clone(),
    )));
    let alerts_handle = tokio::spawn(supervise_alerts(
        blinkers.clone(),
        state_rx.clone(),
        cancel.clone(),
    ));

    let app = api::router(ApiState::new(state_rx, blinkers, port));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.status_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind monitor status server at {addr}"))?;

    info!("monitor status listening on http://{addr}");
    let shutdown = cancel.clone();
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => info!("shutdown requested"),
                _ = shutdown.cancelled() => {}
            }
        })
        .await;

    cancel.cancel();
    if let Err(err) = poller_handle.await {
        warn!("poller task ended abnormally: {err}");
    }
    if let Err(err) = alerts_handle.await {
        warn!("alert task ended abnormally: {err}");
    }

    served.context("monitor status server failed")
}

async fn load_config() -> MonitorConfig {
    let mut config = match std::env::var(ENV_CONFIG_PATH) {
        Ok(path) => read_config_file(Path::new(&path))
            .await
            .unwrap_or_else(|err| {
                warn!("failed to load monitor config from {path}: {err:#}");
                MonitorConfig::default()
            }),
        Err(_) => MonitorConfig::default(),
    };

    config.apply_env(|key| std::env::var(key).ok());
    config.sanitize();
    config
}

async fn read_config_file(path: &Path) -> anyhow::Result<MonitorConfig> {
    match tokio::fs::read(path).await {
        Ok(raw) => Ok(serde_json::from_slice::<MonitorConfig>(&raw)?),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(MonitorConfig::default()),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_config_file_falls_back_to_defaults() {
        let config = read_config_file(Path::new("./does-not-exist/monitor.json"))
            .await
            .unwrap();

        assert_eq!(config, MonitorConfig::default());
    }

    #[tokio::test]
    async fn config_file_is_parsed() {
        let path = std::env::temp_dir().join(format!("soilmon-config-{}.json", std::process::id()));
        tokio::fs::write(&path, br#"{"timing":{"poll_interval_ms":2000},"status_port":9100}"#)
            .await
            .unwrap();

        let config = read_config_file(&path).await.unwrap();
        let _ = tokio::fs::remove_file(&path).await;

        assert_eq!(config.timing.poll_interval_ms, 2_000);
        assert_eq!(config.timing.blink_interval_ms, 500);
        assert_eq!(config.status_port, 9100);
    }

    #[tokio::test]
    async fn malformed_config_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("soilmon-bad-{}.json", std::process::id()));
        tokio::fs::write(&path, b"{not json").await.unwrap();

        let result = read_config_file(&path).await;
        let _ = tokio::fs::remove_file(&path).await;

        assert!(result.is_err());
    }
}
