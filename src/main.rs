use ringtrace::core::Config;
use ringtrace::{api, metrics};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("🚀 ringtrace - Fraud Ring Detection Engine");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Initialize Prometheus metrics
    metrics::init_metrics();
    info!("📊 Metrics initialized");

    // Load configuration from environment
    let config = Config::from_env();
    info!("🔍 Default detection mode: {}", config.default_mode);

    info!(
        "🌐 Starting REST API server on {}:{}",
        config.host, config.port
    );
    api::start_server(config).await?;

    Ok(())
}
