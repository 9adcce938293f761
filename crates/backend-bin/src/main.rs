use std::path::PathBuf;
use std::net::SocketAddr;
use std::sync::Arc;
use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tokio::time::interval;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use backend_lib::{
    AppState,
    config::{LogFormat, Settings, StorageBackend},
    router,
    storage::{DocumentStore, FlatFileStore, MemoryStore},
};

/// Account, session and blog HTTP service
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the configured bind address
    #[arg(long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load_from(&args.config)
        .with_context(|| format!("loading configuration from {}", args.config.display()))?;
    if let Some(bind) = args.bind {
        settings.bind_addr = bind;
    }

    init_tracing(&settings);

    match settings.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; data is lost on shutdown");
            serve(MemoryStore::new(), settings).await
        },
        StorageBackend::FlatFile => {
            let store = FlatFileStore::new(&settings.storage.path)
                .with_context(|| format!("opening store at {}", settings.storage.path.display()))?;
            serve(store, settings).await
        },
    }
}

/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match settings.log_format {
        LogFormat::Json => registry.with(fmt::layer().json().with_target(true)).init(),
        LogFormat::Pretty => registry.with(fmt::layer().with_target(false)).init(),
    }
}

async fn serve<S: DocumentStore + 'static>(store: S, settings: Settings) -> anyhow::Result<()> {
    let addr = settings.bind_addr;
    let purge_every = settings.purge_interval();

    // Create application state
    let state = Arc::new(AppState::new(store, settings)?);

    // Setup a background task for expired document cleanup
    let store = state.store.clone();
    tokio::spawn(async move {
        let mut interval = interval(purge_every);
        loop {
            interval.tick().await;
            match store.purge_expired().await {
                Ok(0) => {},
                Ok(removed) => tracing::debug!(removed, "purged expired documents"),
                Err(e) => tracing::warn!(error = %e, "expired document purge failed"),
            }
        }
    });

    let app = router::create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
