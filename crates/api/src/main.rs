use std::sync::Arc;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = gatehouse_api::config::AppConfig::from_env()?;
    let services = Arc::new(gatehouse_api::app::services::build_services(&config).await?);
    gatehouse_api::app::services::bootstrap_admin(&services, &config).await?;

    let app = gatehouse_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize process-wide tracing (JSON logs, configurable via RUST_LOG).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_target(false)
        .try_init();
}
