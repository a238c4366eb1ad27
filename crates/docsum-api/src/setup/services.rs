//! Service client construction

use crate::pipeline::DocumentPipeline;
use crate::state::AppState;
use anyhow::{Context, Result};
use docsum_core::Config;
use docsum_services::{AzureOpenAiClient, DocumentIntelligenceClient};
use docsum_storage::BlobStore;
use std::sync::Arc;

/// Build the OCR and summarization clients and assemble the application state.
pub async fn initialize_services(
    config: &Config,
    store: Arc<dyn BlobStore>,
) -> Result<Arc<AppState>> {
    let extractor = DocumentIntelligenceClient::from_config(config)
        .context("Failed to create Document Intelligence client")?;
    tracing::info!(
        endpoint = %config.document_intelligence_endpoint(),
        model = %config.document_intelligence_model(),
        "Document Intelligence client initialized"
    );

    let summarizer = AzureOpenAiClient::from_config(config)
        .context("Failed to create Azure OpenAI client")?;
    tracing::info!(
        endpoint = %config.azure_openai_endpoint(),
        deployment = %config.azure_openai_deployment(),
        "Azure OpenAI client initialized"
    );

    let temp_root = config.upload_temp_dir();
    tokio::fs::create_dir_all(&temp_root)
        .await
        .with_context(|| format!("Failed to create upload temp dir {}", temp_root.display()))?;

    let pipeline = DocumentPipeline::new(
        store,
        Arc::new(extractor),
        Arc::new(summarizer),
        config.blob_container(),
        temp_root,
    );
    tracing::info!(
        storage = %pipeline.storage_backend(),
        container = %pipeline.container(),
        temp_root = %pipeline.temp_root().display(),
        "Document pipeline ready"
    );

    Ok(Arc::new(AppState::new(config.clone(), pipeline)))
}
