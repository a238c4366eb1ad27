#[cfg(feature = "storage-azure")]
use crate::AzureBlobStorage;
#[cfg(feature = "storage-local")]
use crate::LocalStorage;
use crate::{BlobStore, StorageBackend, StorageError, StorageResult};
use docsum_core::Config;
use std::sync::Arc;

/// Create a blob store based on configuration
pub async fn create_blob_store(config: &Config) -> StorageResult<Arc<dyn BlobStore>> {
    match config.storage_backend() {
        #[cfg(feature = "storage-azure")]
        StorageBackend::Azure => {
            let connection_string = config.azure_storage_connection_string().ok_or_else(|| {
                StorageError::ConfigError(
                    "AZURE_STORAGE_CONNECTION_STRING not configured".to_string(),
                )
            })?;

            let storage = AzureBlobStorage::from_connection_string(connection_string)?;
            tracing::debug!(account = %storage.account_name(), "Azure blob store configured");
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-azure"))]
        StorageBackend::Azure => Err(StorageError::ConfigError(
            "Azure storage backend not available (storage-azure feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config.local_storage_path().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let base_url = config
                .local_storage_base_url()
                .map(String::from)
                .ok_or_else(|| {
                    StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
                })?;

            let storage = LocalStorage::new(base_path, base_url).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}
