//! Upload → extract → summarize pipeline
//!
//! One call handles one uploaded document. The bytes are written into a fresh
//! temporary directory, pushed to blob storage, read back by the OCR service through
//! the blob URL and finally summarized. Stages run strictly in sequence and the first
//! failure aborts the rest. The temporary directory is removed when the call returns,
//! whether it succeeded or not.

use bytes::Bytes;
use docsum_core::AppError;
use docsum_services::{ExtractError, SummarizeError, Summarizer, TextExtractor};
use docsum_storage::{BlobStore, StorageBackend, StorageError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Failure of one pipeline stage
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to stage upload locally: {0}")]
    Staging(#[from] std::io::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Summarize(#[from] SummarizeError),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        let detail = err.to_string();
        match err {
            PipelineError::Staging(_) => AppError::Internal(detail),
            PipelineError::Storage(e) => match e {
                StorageError::Connection(_) | StorageError::UploadFailed(_) => {
                    AppError::StorageUnavailable(detail)
                }
                StorageError::InvalidKey(_) => AppError::InvalidInput("Invalid filename".to_string()),
                StorageError::NotFound(_) | StorageError::IoError(_) | StorageError::ConfigError(_) => {
                    AppError::Internal(detail)
                }
            },
            PipelineError::Extract(e) => match e {
                ExtractError::Auth(_) => AppError::UpstreamAuth(detail),
                ExtractError::Analysis(_) | ExtractError::Request(_) => AppError::Extraction(detail),
                ExtractError::MalformedResponse(_) => AppError::MalformedUpstream(detail),
            },
            PipelineError::Summarize(e) => match e {
                SummarizeError::Remote(_) => AppError::Summarization(detail),
                SummarizeError::MalformedResponse(_) => AppError::MalformedUpstream(detail),
            },
        }
    }
}

/// The three service clients plus where uploads are staged and stored
#[derive(Clone)]
pub struct DocumentPipeline {
    store: Arc<dyn BlobStore>,
    extractor: Arc<dyn TextExtractor>,
    summarizer: Arc<dyn Summarizer>,
    container: String,
    temp_root: PathBuf,
}

impl DocumentPipeline {
    pub fn new(
        store: Arc<dyn BlobStore>,
        extractor: Arc<dyn TextExtractor>,
        summarizer: Arc<dyn Summarizer>,
        container: impl Into<String>,
        temp_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            extractor,
            summarizer,
            container: container.into(),
            temp_root: temp_root.into(),
        }
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.store.backend_type()
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn temp_root(&self) -> &Path {
        &self.temp_root
    }

    /// Summarize one uploaded document.
    ///
    /// `filename` must already be sanitized to a bare base name; it becomes both the
    /// staged file name and the blob key.
    pub async fn summarize_upload(&self, filename: &str, data: Bytes) -> Result<String, PipelineError> {
        let start = Instant::now();

        // Unique per request, removed on drop.
        let workspace = tempfile::Builder::new()
            .prefix("docsum-")
            .tempdir_in(&self.temp_root)?;
        let local_path = workspace.path().join(filename);
        tokio::fs::write(&local_path, &data).await?;

        let blob_url = self.store.upload_file(&local_path, &self.container).await?;
        tracing::debug!(blob_url = %blob_url, "Document stored");

        let text = self.extractor.extract(&blob_url).await?;
        if text.is_empty() {
            tracing::warn!(filename = %filename, "No text extracted from document");
        }

        let summary = self.summarizer.summarize(&text).await?;

        tracing::info!(
            filename = %filename,
            size_bytes = data.len(),
            text_length = text.len(),
            summary_length = summary.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Document summarized"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsum_core::ErrorMetadata;

    #[test]
    fn test_storage_connection_maps_to_unavailable() {
        let err: AppError =
            PipelineError::from(StorageError::Connection("dns error".to_string())).into();
        assert_eq!(err.error_code(), "STORAGE_UNAVAILABLE");
        assert_eq!(err.http_status_code(), 502);
    }

    #[test]
    fn test_extract_errors_map_by_kind() {
        let auth: AppError = PipelineError::from(ExtractError::Auth("401".to_string())).into();
        let failed: AppError =
            PipelineError::from(ExtractError::Analysis("failed".to_string())).into();
        let malformed: AppError =
            PipelineError::from(ExtractError::MalformedResponse("no body".to_string())).into();

        assert_eq!(auth.error_code(), "UPSTREAM_AUTH_FAILED");
        assert_eq!(failed.error_code(), "EXTRACTION_FAILED");
        assert_eq!(malformed.error_code(), "MALFORMED_UPSTREAM_RESPONSE");
    }

    #[test]
    fn test_summarize_errors_map_by_kind() {
        let remote: AppError =
            PipelineError::from(SummarizeError::Remote("500".to_string())).into();
        let empty: AppError =
            PipelineError::from(SummarizeError::MalformedResponse("no choices".to_string())).into();

        assert_eq!(remote.error_code(), "SUMMARIZATION_FAILED");
        assert_eq!(empty.error_code(), "MALFORMED_UPSTREAM_RESPONSE");
    }

    #[test]
    fn test_upstream_detail_kept_for_logs() {
        let err: AppError =
            PipelineError::from(SummarizeError::Remote("429 Too Many Requests".to_string())).into();
        assert!(err.to_string().contains("429"));
        assert!(!err.client_message().contains("429"));
    }
}
