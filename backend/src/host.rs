use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use crate::{
    server::{router, BackendState},
    simulator::run_simulation,
};

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let state = BackendState::default();

    let simulate_ms = std::env::var("BACKEND_SIMULATE_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|ms| *ms > 0);
    if let Some(ms) = simulate_ms {
        info!("simulated sensor feed enabled (every {ms} ms)");
        tokio::spawn(run_simulation(state.clone(), Duration::from_millis(ms)));
    }

    let port = std::env::var("BACKEND_HTTP_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind backend server at {addr}"))?;

    info!("server started on http://{addr}");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
