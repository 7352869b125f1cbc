use std::sync::Arc;

use anyhow::{Context, Result};
use rentelme::{
    build_router,
    services::{
        database::Database,
        image_store::HttpImageStore,
        store::{DocumentStore, MemoryStore, PgStore},
    },
    utilities::{
        app_state::AppState,
        config::{Config, StoreBackend},
    },
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::init()
        .await
        .context("failed to load application configuration")?;
    init_tracing(&config);

    let store: Arc<dyn DocumentStore> = match config.store_backend {
        StoreBackend::Postgres => {
            info!("store backend: postgres");
            let database = Database::new(&config)
                .await
                .context("failed to connect to PostgreSQL")?;
            Arc::new(PgStore::new(database))
        }
        StoreBackend::Memory => {
            info!("store backend: memory");
            Arc::new(MemoryStore::new())
        }
    };

    store
        .init()
        .await
        .context("failed to initialize the document store")?;

    let images = Arc::new(HttpImageStore::new(config.image_store_url.clone()));
    let addr = config.server_addres.clone();

    let state = AppState::new(store, images, config)
        .await
        .context("failed to start the premium feed")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(address = %addr, "rentelme started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

fn init_tracing(config: &Config) {
    let fallback = format!(
        "rentelme={},tower_http=info",
        config.tracing_level.as_str().to_lowercase()
    );
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install Ctrl+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install SIGTERM handler");
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
