use constants::STARTUP_TIME;

mod cache;
mod config;
mod constants;
mod error;
mod init;
mod models;
mod query;
mod routes;
mod state;
mod stats;
mod store;
mod telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let _ = &*STARTUP_TIME;

    let telemetry = telemetry::init_telemetry()?;
    let config = config::Config::from_env()?;

    let (app, store) = init::init(&config).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening for requests.");

    axum::serve(listener, app)
        .with_graceful_shutdown(init::shutdown_signal())
        .await?;

    store.close().await;
    telemetry.shutdown();

    Ok(())
}
