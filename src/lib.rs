mod db;
pub mod error;
pub mod feed;
pub mod ingest;
pub mod routes;
pub mod settings;
pub mod stats;
pub mod store;
mod utils;

use std::{future::Future, sync::Arc};

use anyhow::{Context, Result};
use log::info;
use tokio::{
    net::TcpListener,
    signal::{self, ctrl_c},
};

pub use db::{FeedbackEvent, FeedbackInput};
use feed::FeedPublisher;
use settings::Settings;
use store::EventStore;

/// Shared handler state. Constructed once at startup and injected into the router.
pub struct AppState {
    pub store: Arc<dyn EventStore>,
    pub feed: FeedPublisher,
}

impl AppState {
    pub fn new(store: Arc<dyn EventStore>, settings: &Settings) -> Arc<Self> {
        Arc::new(Self {
            feed: FeedPublisher::new(store.clone(), settings.feed_interval()),
            store,
        })
    }
}

pub async fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    info!("TeamPulse starting up...");

    let settings = Settings::load().context("failed to load settings")?;
    let store = store::open_store(&settings.store)
        .await
        .context("failed to open feedback store")?;
    let state = AppState::new(store, &settings);

    let address = settings.bind_addr();
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!("Server running on {address}");

    serve(listener, state, shutdown_signal()).await?;

    info!("Server shutting down...");
    Ok(())
}

/// Serve the router until `shutdown` resolves.
///
/// Live feeds are cancelled as soon as the signal fires. Their streams never
/// end on their own, and graceful shutdown waits for every open response.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let feed = state.feed.clone();
    let app = routes::router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            feed.shutdown();
        })
        .await
        .context("server error")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                log::error!("Failed to install signal handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
