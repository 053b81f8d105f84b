use axum::{http::Request, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::Level;

use crate::{cache::new_cache, config::Config, routes::router, state::AppState, store::QuoteStore};

async fn init_database(config: &Config) -> anyhow::Result<QuoteStore> {
    let store = QuoteStore::connect(config).await?;

    if config.run_migrations {
        store.migrate().await?;
    }

    Ok(store)
}

fn init_state(config: &Config, store: QuoteStore) -> AppState {
    let cache = if config.cache_enabled {
        tracing::info!(capacity = config.cache_capacity, "response cache enabled.");
        Some(new_cache(config.cache_capacity))
    } else {
        tracing::warn!("response cache disabled. every request will hit the database.");
        None
    };

    AppState::new(store, cache)
}

fn init_router(state: AppState) -> Router {
    router(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::span!(
                    Level::INFO,
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    query = request.uri().query().unwrap_or("")
                )
            }),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Open the database and build the application.
///
/// The returned store is the same handle the router uses; close it once the
/// server has stopped.
pub async fn init(config: &Config) -> anyhow::Result<(Router, QuoteStore)> {
    tracing::info!("initializing... please wait warmly.");

    let store = init_database(config).await?;
    let app = init_router(init_state(config, store.clone()));

    tracing::info!("finished initializing!");
    Ok((app, store))
}

/// Resolves on SIGINT, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(err = ?e, "an error occurred when listening for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(err = ?e, "an error occurred when installing the SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received SIGINT, shutting down..."),
        _ = terminate => tracing::info!("received SIGTERM, shutting down..."),
    }
}
