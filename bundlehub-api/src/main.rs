//! # BundleHub API Server
//!
//! The HTTP server for BundleHub: accepts app-bundle uploads, stores bundle
//! bytes in object storage, and records version/channel metadata in Postgres.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p bundlehub-api
//! ```

use bundlehub_api::app::{build_router, AppState};
use bundlehub_api::config::Config;
use bundlehub_shared::db::migrations::run_migrations;
use bundlehub_shared::db::pool::{close_pool, create_pool, DatabaseConfig};
use bundlehub_shared::storage::{FilesystemBackend, ObjectStore};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bundlehub_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "BundleHub API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let db = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&db).await?;

    let storage: Arc<dyn ObjectStore> =
        Arc::new(FilesystemBackend::new(&config.storage.root).await?);
    storage.health_check().await?;
    tracing::info!(
        backend = storage.backend_name(),
        root = %config.storage.root,
        "Object storage ready"
    );

    let bind_address = config.bind_address();
    let state = AppState::new(db.clone(), storage, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received, exiting...");
        })
        .await?;

    close_pool(db).await;

    Ok(())
}
