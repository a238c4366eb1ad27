//! Docsum Services Library
//!
//! Clients for the two cloud services the upload pipeline calls after storing a
//! document: Azure AI Document Intelligence for text extraction and Azure OpenAI for
//! summarization. Each client sits behind a small trait so the HTTP layer can be
//! tested without network access.

pub mod extractor;
pub mod summarizer;

use reqwest::Client;
use std::time::Duration;

pub use extractor::{
    flatten_lines, AnalyzeResult, DocumentIntelligenceClient, DocumentIntelligenceSettings,
    ExtractError, TextExtractor,
};
pub use summarizer::{
    AzureOpenAiClient, AzureOpenAiSettings, ChatCompletion, SummarizeError, Summarizer,
    SYSTEM_PROMPT,
};

/// Shared HTTP client construction: every outbound client carries an explicit timeout.
pub(crate) fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("docsum/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Best-effort read of an error body for logs.
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string())
}
