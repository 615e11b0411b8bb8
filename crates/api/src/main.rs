use anyhow::Context;
use api::{telemetry, AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    telemetry::init(config.json_logs);

    let state = AppState::from_config(&config).context("loading the catalog")?;
    let app = api::router(state, config.request_timeout());

    let addr = config.socket_addr();
    tracing::info!(
        %addr,
        budget_secs = config.engine.budget.as_secs(),
        strategy_limit = ?config.engine.strategy_limit,
        "listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown())
        .await?;
    Ok(())
}

async fn shutdown() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "cannot listen for ctrl-c");
    }
    tracing::info!("shutting down");
}
