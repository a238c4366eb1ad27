// Azure OpenAI chat-completions client for document summaries

use async_trait::async_trait;
use docsum_core::Config;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;
use thiserror::Error;

use crate::{build_http_client, error_body};

/// System instruction sent ahead of every document.
pub const SYSTEM_PROMPT: &str = "Summarize the following document in key points.";

#[derive(Debug, Error)]
pub enum SummarizeError {
    /// Transport failure or a non-success status from the service.
    #[error("Azure OpenAI request failed: {0}")]
    Remote(String),

    #[error("Malformed Azure OpenAI response: {0}")]
    MalformedResponse(String),
}

/// Produces a summary of extracted document text.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError>;
}

#[derive(Clone)]
pub struct AzureOpenAiSettings {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl AzureOpenAiSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            endpoint: config.azure_openai_endpoint().to_string(),
            api_key: config.azure_openai_key().to_string(),
            deployment: config.azure_openai_deployment().to_string(),
            api_version: config.azure_openai_api_version().to_string(),
            max_tokens: config.summary_max_tokens(),
            timeout: Duration::from_secs(config.http_timeout_secs()),
        }
    }
}

impl Debug for AzureOpenAiSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AzureOpenAiSettings")
            .field("endpoint", &self.endpoint)
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

// Chat completions request/response structures
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Outcome of a chat completion: the first choice's content, or nothing usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCompletion {
    Message(String),
    /// No choices, or the first choice carries no content.
    Empty,
}

impl ChatCompletion {
    fn from_response(response: ChatCompletionResponse) -> Self {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.is_empty())
            .map(ChatCompletion::Message)
            .unwrap_or(ChatCompletion::Empty)
    }

    /// Parse a raw chat-completions body.
    pub fn from_json(body: &str) -> Result<Self, SummarizeError> {
        serde_json::from_str::<ChatCompletionResponse>(body)
            .map(ChatCompletion::from_response)
            .map_err(|e| {
                SummarizeError::MalformedResponse(format!("Failed to parse completion: {}", e))
            })
    }
}

/// Azure OpenAI client for a single chat deployment
pub struct AzureOpenAiClient {
    http_client: Client,
    settings: AzureOpenAiSettings,
}

impl Debug for AzureOpenAiClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AzureOpenAiClient")
            .field("settings", &self.settings)
            .finish()
    }
}

impl AzureOpenAiClient {
    pub fn new(settings: AzureOpenAiSettings) -> Result<Self, SummarizeError> {
        let http_client = build_http_client(settings.timeout).map_err(|e| {
            SummarizeError::Remote(format!("Failed to create HTTP client for Azure OpenAI: {}", e))
        })?;

        Ok(Self {
            http_client,
            settings,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, SummarizeError> {
        Self::new(AzureOpenAiSettings::from_config(config))
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.deployment,
            self.settings.api_version
        )
    }
}

#[async_trait]
impl Summarizer for AzureOpenAiClient {
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        let start = std::time::Instant::now();

        let request = ChatCompletionRequest {
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            max_tokens: self.settings.max_tokens,
        };

        let response = self
            .http_client
            .post(self.completions_url())
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SummarizeError::Remote(format!("Failed to call Azure OpenAI: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response).await;
            return Err(SummarizeError::Remote(format!(
                "Azure OpenAI returned {} - {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SummarizeError::Remote(format!("Failed to read completion: {}", e)))?;

        match ChatCompletion::from_json(&body)? {
            ChatCompletion::Message(summary) => {
                tracing::info!(
                    deployment = %self.settings.deployment,
                    input_length = text.len(),
                    summary_length = summary.len(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Summarization successful"
                );
                Ok(summary)
            }
            ChatCompletion::Empty => Err(SummarizeError::MalformedResponse(
                "Completion has no first choice with content".to_string(),
            )),
        }
    }
}
