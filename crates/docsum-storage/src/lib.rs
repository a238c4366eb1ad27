//! Docsum Storage Library
//!
//! This crate provides the blob store abstraction used by the upload pipeline and its
//! implementations for Azure Blob Storage and the local filesystem.
//!
//! # Blob key format
//!
//! A blob's key is the base name of the local file that was uploaded, placed inside the
//! requested container. Uploading the same base name twice overwrites the earlier blob.
//! Key and container validation is centralized in the `keys` module so all backends
//! stay consistent.

#[cfg(feature = "storage-azure")]
pub mod azure;
pub mod connection_string;
pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod traits;

// Re-export commonly used types
#[cfg(feature = "storage-azure")]
pub use azure::AzureBlobStorage;
pub use connection_string::ConnectionString;
pub use docsum_core::StorageBackend;
pub use factory::create_blob_store;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use traits::{BlobStore, StorageError, StorageResult, DEFAULT_CONTAINER};
