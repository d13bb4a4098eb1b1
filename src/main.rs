//! guestlens gateway entry point.
//!
//! Starts the Axum HTTP server with REST, WebSocket and file endpoints.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use guestlens::api;
use guestlens::app_state::AppState;
use guestlens::config::GalleryConfig;
use guestlens::domain::{EventBus, RecordStore};
use guestlens::identity::{AccountRegistry, AuthError};
use guestlens::persistence::seed::demo_records;
use guestlens::persistence::{RecordSet, SnapshotStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GalleryConfig::from_env().context("invalid LISTEN_ADDR")?;
    tracing::info!(addr = %config.listen_addr, "starting guestlens");

    // Build domain layer
    let seed = config.seed_demo_data;
    let seed_records = move || if seed { demo_records() } else { RecordSet::default() };
    let store = if config.persistence_enabled {
        let snapshots = SnapshotStore::new(&config.snapshot_path);
        RecordStore::open(snapshots, seed_records)
            .await
            .with_context(|| format!("opening {}", config.snapshot_path.display()))?
    } else {
        RecordStore::from_records(seed_records(), None)
    };
    let store = Arc::new(store);
    let event_bus = EventBus::new(config.event_bus_capacity);

    // Identity accounts for the directory users
    let accounts = Arc::new(AccountRegistry::new(config.token_ttl));
    if config.seed_demo_data {
        for user in store.users().await {
            match accounts.register_with_id(
                user.id.clone(),
                &user.email,
                &config.demo_password,
                user.display_name.as_deref(),
            ) {
                Ok(()) | Err(AuthError::EmailInUse) => {}
                Err(e) => tracing::warn!(user_id = %user.id, error = %e, "demo account skipped"),
            }
        }
    }

    tokio::fs::create_dir_all(&config.storage_root)
        .await
        .with_context(|| format!("creating {}", config.storage_root.display()))?;

    let app_state = AppState::new(store, event_bus, accounts);
    let app = api::build_app(app_state, &config.storage_root);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
