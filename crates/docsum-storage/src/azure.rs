use crate::connection_string::{ConnectionString, StorageCredential};
use crate::keys;
use crate::traits::{BlobStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::azure::{MicrosoftAzure, MicrosoftAzureBuilder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload, Result as ObjectResult, RetryConfig};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Azure Blob Storage implementation
///
/// One `MicrosoftAzure` client is built lazily per container and cached; the
/// account and credentials come from a single connection string.
pub struct AzureBlobStorage {
    connection: ConnectionString,
    retry: RetryConfig,
    stores: Mutex<HashMap<String, Arc<MicrosoftAzure>>>,
}

impl AzureBlobStorage {
    /// Create a new AzureBlobStorage from an Azure Storage connection string
    pub fn from_connection_string(raw: &str) -> StorageResult<Self> {
        let connection = ConnectionString::parse(raw)?;
        Ok(Self::new(connection))
    }

    pub fn new(connection: ConnectionString) -> Self {
        AzureBlobStorage {
            connection,
            retry: RetryConfig::default(),
            stores: Mutex::new(HashMap::new()),
        }
    }

    /// Limit transient-failure retries of the underlying client.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.retry = RetryConfig {
            max_retries,
            retry_timeout: Duration::from_secs(30),
            ..RetryConfig::default()
        };
        self
    }

    pub fn account_name(&self) -> &str {
        &self.connection.account_name
    }

    fn store_for(&self, container: &str) -> StorageResult<Arc<MicrosoftAzure>> {
        let mut stores = self
            .stores
            .lock()
            .map_err(|_| StorageError::ConfigError("Azure client cache poisoned".to_string()))?;

        if let Some(store) = stores.get(container) {
            return Ok(Arc::clone(store));
        }

        let store = Arc::new(self.build_store(container)?);
        stores.insert(container.to_string(), Arc::clone(&store));
        Ok(store)
    }

    fn build_store(&self, container: &str) -> StorageResult<MicrosoftAzure> {
        let mut builder = MicrosoftAzureBuilder::new()
            .with_account(self.connection.account_name.clone())
            .with_container_name(container)
            .with_retry(self.retry.clone());

        builder = match &self.connection.credential {
            StorageCredential::AccountKey(key) => builder.with_access_key(key.clone()),
            StorageCredential::SharedAccessSignature(_) => builder
                .with_sas_authorization(self.connection.sas_query_pairs().unwrap_or_default()),
            StorageCredential::Emulator => builder.with_use_emulator(true),
        };

        if !self.connection.is_emulator() {
            let endpoint = self.connection.blob_service_url();
            let allow_http = endpoint.starts_with("http://");
            builder = builder.with_endpoint(endpoint).with_allow_http(allow_http);
        }

        builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))
    }

    fn map_put_error(err: ObjectStoreError) -> StorageError {
        match err {
            ObjectStoreError::Unauthenticated { .. } | ObjectStoreError::PermissionDenied { .. } => {
                StorageError::Connection(format!("credentials rejected: {}", err))
            }
            other => StorageError::Connection(other.to_string()),
        }
    }
}

#[async_trait]
impl BlobStore for AzureBlobStorage {
    async fn put(&self, container: &str, key: &str, data: Bytes) -> StorageResult<String> {
        keys::validate_container(container)?;
        keys::validate_key(key)?;

        let store = self.store_for(container)?;
        let size = data.len();
        let location = Path::from(key);
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = store.put(&location, PutPayload::from(data)).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                account = %self.connection.account_name,
                container = %container,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Azure blob upload failed"
            );
            Self::map_put_error(e)
        })?;

        let mut url = keys::blob_url(&self.connection.blob_service_url(), container, key);
        // The OCR service fetches the blob itself; a private container needs the token.
        if let Some(sas) = self.connection.sas_token() {
            url.push('?');
            url.push_str(sas);
        }

        tracing::info!(
            account = %self.connection.account_name,
            container = %container,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Azure blob upload successful"
        );

        Ok(url)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Azure
    }
}
