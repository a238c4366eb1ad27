// Azure AI Document Intelligence client for text extraction

use async_trait::async_trait;
use docsum_core::Config;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

use crate::{build_http_client, error_body};

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OPERATION_LOCATION_HEADER: &str = "Operation-Location";

/// Text extraction errors
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The service rejected the subscription key (401/403).
    #[error("Document Intelligence rejected credentials: {0}")]
    Auth(String),

    /// The analysis job failed, was canceled or never finished.
    #[error("Document analysis failed: {0}")]
    Analysis(String),

    #[error("Document Intelligence request failed: {0}")]
    Request(String),

    #[error("Malformed Document Intelligence response: {0}")]
    MalformedResponse(String),
}

/// Extracts the text of a document reachable at a URL.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, document_url: &str) -> Result<String, ExtractError>;
}

/// Connection and polling settings for Document Intelligence
#[derive(Clone)]
pub struct DocumentIntelligenceSettings {
    pub endpoint: String,
    pub api_key: String,
    /// Model id, `prebuilt-read` for plain OCR.
    pub model: String,
    pub api_version: String,
    /// Delay between polls when the service sends no `Retry-After`.
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    /// Cap on a server-sent `Retry-After`.
    pub max_poll_delay: Duration,
    pub timeout: Duration,
}

impl DocumentIntelligenceSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            endpoint: config.document_intelligence_endpoint().to_string(),
            api_key: config.document_intelligence_key().to_string(),
            model: config.document_intelligence_model().to_string(),
            api_version: config.document_intelligence_api_version().to_string(),
            poll_interval: Duration::from_millis(config.ocr_poll_interval_ms()),
            max_poll_attempts: config.ocr_max_poll_attempts(),
            max_poll_delay: Duration::from_secs(config.ocr_max_poll_delay_secs()),
            timeout: Duration::from_secs(config.http_timeout_secs()),
        }
    }
}

impl Debug for DocumentIntelligenceSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("DocumentIntelligenceSettings")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_version", &self.api_version)
            .field("poll_interval", &self.poll_interval)
            .field("max_poll_attempts", &self.max_poll_attempts)
            .field("max_poll_delay", &self.max_poll_delay)
            .finish_non_exhaustive()
    }
}

// Analyze API request/response structures
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest<'a> {
    url_source: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeOperation {
    status: OperationStatus,
    #[serde(default)]
    analyze_result: Option<AnalyzeResult>,
    #[serde(default)]
    error: Option<OperationError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
enum OperationStatus {
    NotStarted,
    Running,
    Succeeded,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl OperationError {
    fn describe(&self) -> String {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => format!("{}: {}", code, message),
            (Some(code), None) => code.clone(),
            (None, Some(message)) => message.clone(),
            (None, None) => "Unknown error".to_string(),
        }
    }
}

/// The part of an analysis result the extractor reads: pages and their lines.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AnalyzeResult {
    #[serde(default)]
    pub pages: Vec<DocumentPage>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct DocumentPage {
    #[serde(default)]
    pub lines: Vec<DocumentLine>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentLine {
    pub content: String,
}

/// Join every line's content with `\n`, pages in order, lines in order within a page.
pub fn flatten_lines(result: &AnalyzeResult) -> String {
    result
        .pages
        .iter()
        .flat_map(|page| page.lines.iter())
        .map(|line| line.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Document Intelligence client using the asynchronous analyze API
pub struct DocumentIntelligenceClient {
    http_client: Client,
    settings: DocumentIntelligenceSettings,
}

impl Debug for DocumentIntelligenceClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("DocumentIntelligenceClient")
            .field("settings", &self.settings)
            .finish()
    }
}

impl DocumentIntelligenceClient {
    pub fn new(settings: DocumentIntelligenceSettings) -> Result<Self, ExtractError> {
        let http_client = build_http_client(settings.timeout).map_err(|e| {
            ExtractError::Request(format!(
                "Failed to create HTTP client for Document Intelligence: {}",
                e
            ))
        })?;

        Ok(Self {
            http_client,
            settings,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ExtractError> {
        Self::new(DocumentIntelligenceSettings::from_config(config))
    }

    fn analyze_url(&self) -> String {
        format!(
            "{}/documentintelligence/documentModels/{}:analyze?api-version={}",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.model,
            self.settings.api_version
        )
    }

    /// Submit the document and return the operation URL to poll
    async fn start_analysis(&self, document_url: &str) -> Result<String, ExtractError> {
        let response = self
            .http_client
            .post(self.analyze_url())
            .header(SUBSCRIPTION_KEY_HEADER, &self.settings.api_key)
            .json(&AnalyzeRequest {
                url_source: document_url,
            })
            .send()
            .await
            .map_err(|e| ExtractError::Request(format!("Failed to submit document: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, "submit", response).await);
        }

        response
            .headers()
            .get(OPERATION_LOCATION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .ok_or_else(|| {
                ExtractError::MalformedResponse(format!(
                    "Analyze request returned {} without an Operation-Location header",
                    status
                ))
            })
    }

    /// Delay before the next poll: `Retry-After` capped at `max_poll_delay`, else the
    /// configured interval.
    fn poll_delay(&self, headers: &HeaderMap) -> Duration {
        retry_after(headers)
            .map(|delay| delay.min(self.settings.max_poll_delay))
            .unwrap_or(self.settings.poll_interval)
    }

    /// Poll the operation until it reaches a terminal status
    async fn poll_analysis(&self, operation_url: &str) -> Result<AnalyzeResult, ExtractError> {
        let max_attempts = self.settings.max_poll_attempts;
        let mut attempts = 0;

        loop {
            let response = self
                .http_client
                .get(operation_url)
                .header(SUBSCRIPTION_KEY_HEADER, &self.settings.api_key)
                .send()
                .await
                .map_err(|e| {
                    ExtractError::Request(format!("Failed to poll analysis status: {}", e))
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(status_error(status, "poll", response).await);
            }

            let delay = self.poll_delay(response.headers());

            let operation: AnalyzeOperation = response.json().await.map_err(|e| {
                ExtractError::MalformedResponse(format!("Failed to parse analysis status: {}", e))
            })?;

            match operation.status {
                OperationStatus::Succeeded => {
                    tracing::info!(attempts = attempts + 1, "Document analysis completed");
                    return operation.analyze_result.ok_or_else(|| {
                        ExtractError::MalformedResponse(
                            "Succeeded analysis has no analyzeResult".to_string(),
                        )
                    });
                }
                OperationStatus::Failed | OperationStatus::Canceled => {
                    let reason = operation
                        .error
                        .map(|e| e.describe())
                        .unwrap_or_else(|| "Unknown error".to_string());
                    return Err(ExtractError::Analysis(format!(
                        "Analysis ended with status {:?}: {}",
                        operation.status, reason
                    )));
                }
                OperationStatus::NotStarted | OperationStatus::Running | OperationStatus::Unknown => {
                    attempts += 1;
                    if attempts >= max_attempts {
                        return Err(ExtractError::Analysis(format!(
                            "Analysis timed out after {} attempts",
                            max_attempts
                        )));
                    }
                    tracing::debug!(
                        attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Document analysis still running"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[async_trait]
impl TextExtractor for DocumentIntelligenceClient {
    async fn extract(&self, document_url: &str) -> Result<String, ExtractError> {
        let start = std::time::Instant::now();

        let operation_url = self.start_analysis(document_url).await?;
        let result = self.poll_analysis(&operation_url).await?;
        let text = flatten_lines(&result);

        tracing::info!(
            model = %self.settings.model,
            pages = result.pages.len(),
            text_length = text.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Text extraction successful"
        );

        Ok(text)
    }
}

async fn status_error(status: StatusCode, stage: &str, response: reqwest::Response) -> ExtractError {
    let body = error_body(response).await;
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ExtractError::Auth(format!("{} returned {} - {}", stage, status, body))
        }
        _ => ExtractError::Request(format!("{} returned {} - {}", stage, status, body)),
    }
}

/// `Retry-After` in whole seconds, as Document Intelligence sends it.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
