#[tokio::main]
async fn main() -> anyhow::Result<()> {
    soilmon_monitor::host::run().await
}
