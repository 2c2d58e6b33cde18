#[tokio::main]
async fn main() -> anyhow::Result<()> {
    soilmon_backend::host::run().await
}
