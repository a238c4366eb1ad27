//! Storage setup and initialization

use anyhow::{Context, Result};
use docsum_core::Config;
use docsum_storage::{create_blob_store, BlobStore};
use std::sync::Arc;

/// Build the blob store selected by `STORAGE_BACKEND`.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn BlobStore>> {
    tracing::info!("Initializing blob storage...");
    let store = create_blob_store(config)
        .await
        .context("Failed to initialize blob storage")?;
    tracing::info!(
        backend = %store.backend_type(),
        container = %config.blob_container(),
        "Blob storage initialized successfully"
    );
    Ok(store)
}
