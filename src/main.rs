//! storefront-sync host process.
//!
//! Bootstraps the sync engine against MongoDB and keeps stale sections
//! refreshed until Ctrl-C.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use storefront_sync::config::Config;
use storefront_sync::database::Database;
use storefront_sync::events::ConfigEvent;
use storefront_sync::fallback::JsonFileStore;
use storefront_sync::gateway::MongoConfigGateway;
use storefront_sync::sync::{BootstrapLoader, SyncEngine};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("storefront_sync=info,mongodb=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    info!("Starting storefront-sync...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            return Err(e);
        }
    };
    info!("Configuration loaded successfully");

    let db = Database::connect(&config.mongodb_uri, &config.mongodb_database).await?;
    if let Err(e) = db.ping().await {
        warn!("Configuration store unreachable at startup: {}", e);
    }

    let gateway = Arc::new(MongoConfigGateway::new(&db));
    let engine = SyncEngine::create(gateway, config.cache_config());

    let mut loader = BootstrapLoader::new(Arc::clone(&engine));
    if let Some(path) = &config.fallback_store_path {
        info!("Using local fallback store at {}", path.display());
        loader = loader.with_fallback(Arc::new(JsonFileStore::new(path)));
    }
    loader.run().await;

    let snapshot = engine.snapshot();
    info!(
        "Serving \"{}\" with {} menu categories",
        snapshot.restaurant_name(),
        snapshot.categories().len()
    );

    let mut events = engine.events().subscribe_stream();
    let mut refresh = tokio::time::interval(config.refresh_interval);
    refresh.tick().await;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
            _ = refresh.tick() => {
                for err in engine.refresh_stale().await {
                    warn!("Refresh failed: {}", err);
                }
            }
            event = events.recv() => match event {
                Ok(ConfigEvent::ConfigSaved { success, failed_sections, .. }) => {
                    info!("Configuration saved (success: {}, failed: {:?})", success, failed_sections);
                }
                Ok(ConfigEvent::MenuSaved) => info!("Menu saved"),
                Err(RecvError::Lagged(skipped)) => warn!("Event stream lagged, {} events skipped", skipped),
                Err(RecvError::Closed) => break,
            },
        }
    }

    engine.dispose();
    db.shutdown().await;

    Ok(())
}
