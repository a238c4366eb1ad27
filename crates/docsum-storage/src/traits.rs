//! Blob store abstraction trait
//!
//! This module defines the BlobStore trait that all storage backends must implement.

use crate::keys;
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;

/// Container used when the caller does not name one.
pub const DEFAULT_CONTAINER: &str = "uploads";

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage endpoint is unreachable or rejected our credentials.
    #[error("Storage connection failed: {0}")]
    Connection(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Blob store abstraction trait
///
/// Backends implement [`put`](BlobStore::put); [`upload_file`](BlobStore::upload_file)
/// is shared so every backend keys blobs by the local file's base name.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `data` under `key` in `container`, replacing any existing blob, and
    /// return the blob's URL.
    async fn put(&self, container: &str, key: &str, data: Bytes) -> StorageResult<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;

    /// Upload a local file to `container` under its base name and return the blob URL.
    ///
    /// Fails with [`StorageError::NotFound`] when the file does not exist. Uploading
    /// the same base name again overwrites the previous blob.
    async fn upload_file(&self, local_path: &Path, container: &str) -> StorageResult<String> {
        let key = keys::blob_key_for(local_path)?;
        keys::validate_container(container)?;

        let data = tokio::fs::read(local_path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(local_path.display().to_string()),
            _ => StorageError::IoError(e),
        })?;

        tracing::debug!(
            container = %container,
            key = %key,
            size_bytes = data.len(),
            backend = %self.backend_type(),
            "Uploading local file to blob storage"
        );

        self.put(container, &key, Bytes::from(data)).await
    }
}
