//! Configuration module
//!
//! Every setting is read once at startup. Required endpoints and credentials for the
//! upload pipeline fail startup when missing instead of failing deep inside a request.

use std::env;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::PathBuf;

use crate::storage_types::StorageBackend;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_CONTAINER: &str = "uploads";
const DEFAULT_OCR_MODEL: &str = "prebuilt-read";
const DEFAULT_OCR_API_VERSION: &str = "2024-11-30";
const DEFAULT_OCR_POLL_INTERVAL_MS: u64 = 1000;
const DEFAULT_OCR_MAX_POLL_ATTEMPTS: u32 = 120;
const DEFAULT_OCR_MAX_POLL_DELAY_SECS: u64 = 30;
const DEFAULT_OPENAI_DEPLOYMENT: &str = "gpt-4";
const DEFAULT_OPENAI_API_VERSION: &str = "2024-06-01";
const DEFAULT_SUMMARY_MAX_TOKENS: u32 = 500;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;
const DEFAULT_MAX_UPLOAD_SIZE_MB: usize = 50;
const DEFAULT_HTTP_CONCURRENCY_LIMIT: usize = 1024;
const DEFAULT_ALLOWED_EXTENSIONS: &str = "pdf,jpg,jpeg,png,bmp,tif,tiff,heif,docx,xlsx,pptx,html";

/// Flat settings for the summarizer service.
#[derive(Clone)]
pub struct SummarizerConfig {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub http_concurrency_limit: usize,
    pub request_timeout_secs: u64,
    pub log_format: String,
    // Storage
    pub storage_backend: StorageBackend,
    pub azure_storage_connection_string: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub blob_container: String,
    // Document Intelligence
    pub document_intelligence_endpoint: String,
    pub document_intelligence_key: String,
    pub document_intelligence_model: String,
    pub document_intelligence_api_version: String,
    pub ocr_poll_interval_ms: u64,
    pub ocr_max_poll_attempts: u32,
    /// Upper bound for a server-sent `Retry-After`
    pub ocr_max_poll_delay_secs: u64,
    // Azure OpenAI
    pub azure_openai_endpoint: String,
    pub azure_openai_key: String,
    pub azure_openai_deployment: String,
    pub azure_openai_api_version: String,
    pub summary_max_tokens: u32,
    // Outbound HTTP
    pub http_timeout_secs: u64,
    // Uploads
    pub max_upload_size_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub upload_temp_dir: Option<PathBuf>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<SummarizerConfig>);

impl Config {
    fn inner(&self) -> &SummarizerConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = SummarizerConfig::from_vars(|key| env::var(key).ok())?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.inner().environment)
    }

    pub fn server_port(&self) -> u16 {
        self.inner().server_port
    }

    pub fn environment(&self) -> &str {
        &self.inner().environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().cors_origins
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.inner().http_concurrency_limit
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.inner().request_timeout_secs
    }

    pub fn log_format(&self) -> &str {
        &self.inner().log_format
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn azure_storage_connection_string(&self) -> Option<&str> {
        self.inner().azure_storage_connection_string.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.inner().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.inner().local_storage_base_url.as_deref()
    }

    pub fn blob_container(&self) -> &str {
        &self.inner().blob_container
    }

    pub fn document_intelligence_endpoint(&self) -> &str {
        &self.inner().document_intelligence_endpoint
    }

    pub fn document_intelligence_key(&self) -> &str {
        &self.inner().document_intelligence_key
    }

    pub fn document_intelligence_model(&self) -> &str {
        &self.inner().document_intelligence_model
    }

    pub fn document_intelligence_api_version(&self) -> &str {
        &self.inner().document_intelligence_api_version
    }

    pub fn ocr_poll_interval_ms(&self) -> u64 {
        self.inner().ocr_poll_interval_ms
    }

    pub fn ocr_max_poll_attempts(&self) -> u32 {
        self.inner().ocr_max_poll_attempts
    }

    pub fn ocr_max_poll_delay_secs(&self) -> u64 {
        self.inner().ocr_max_poll_delay_secs
    }

    pub fn azure_openai_endpoint(&self) -> &str {
        &self.inner().azure_openai_endpoint
    }

    pub fn azure_openai_key(&self) -> &str {
        &self.inner().azure_openai_key
    }

    pub fn azure_openai_deployment(&self) -> &str {
        &self.inner().azure_openai_deployment
    }

    pub fn azure_openai_api_version(&self) -> &str {
        &self.inner().azure_openai_api_version
    }

    pub fn summary_max_tokens(&self) -> u32 {
        self.inner().summary_max_tokens
    }

    pub fn http_timeout_secs(&self) -> u64 {
        self.inner().http_timeout_secs
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.inner().max_upload_size_bytes
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.inner().allowed_extensions
    }

    /// Directory under which per-request temp directories are created.
    pub fn upload_temp_dir(&self) -> PathBuf {
        self.inner()
            .upload_temp_dir
            .clone()
            .unwrap_or_else(env::temp_dir)
    }
}

fn is_production_name(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, anyhow::Error> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow::anyhow!("{} must be set", key))
}

fn parsed_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl SummarizerConfig {
    /// Build the configuration from a variable lookup (the process environment in
    /// production, a map in tests).
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = lookup("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port = match lookup("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => DEFAULT_PORT,
        };

        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(raw) => raw.parse()?,
            None => StorageBackend::Azure,
        };

        let max_upload_size_mb = parsed_or(&lookup, "MAX_UPLOAD_SIZE_MB", DEFAULT_MAX_UPLOAD_SIZE_MB);

        let max_upload_size_bytes = max_upload_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| {
                anyhow::anyhow!("MAX_UPLOAD_SIZE_MB is too large: {}", max_upload_size_mb)
            })?;

        let config = SummarizerConfig {
            server_port,
            environment,
            cors_origins,
            http_concurrency_limit: parsed_or(
                &lookup,
                "HTTP_CONCURRENCY_LIMIT",
                DEFAULT_HTTP_CONCURRENCY_LIMIT,
            ),
            request_timeout_secs: parsed_or(
                &lookup,
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            ),
            log_format: lookup("LOG_FORMAT")
                .unwrap_or_else(|| "compact".to_string())
                .to_lowercase(),
            storage_backend,
            azure_storage_connection_string: lookup("AZURE_STORAGE_CONNECTION_STRING")
                .filter(|s| !s.trim().is_empty()),
            local_storage_path: lookup("LOCAL_STORAGE_PATH").filter(|s| !s.is_empty()),
            local_storage_base_url: lookup("LOCAL_STORAGE_BASE_URL").filter(|s| !s.is_empty()),
            blob_container: lookup("BLOB_CONTAINER")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CONTAINER.to_string()),
            document_intelligence_endpoint: required(&lookup, "DOCUMENT_INTELLIGENCE_ENDPOINT")?,
            document_intelligence_key: required(&lookup, "DOCUMENT_INTELLIGENCE_KEY")?,
            document_intelligence_model: lookup("DOCUMENT_INTELLIGENCE_MODEL")
                .unwrap_or_else(|| DEFAULT_OCR_MODEL.to_string()),
            document_intelligence_api_version: lookup("DOCUMENT_INTELLIGENCE_API_VERSION")
                .unwrap_or_else(|| DEFAULT_OCR_API_VERSION.to_string()),
            ocr_poll_interval_ms: parsed_or(
                &lookup,
                "OCR_POLL_INTERVAL_MS",
                DEFAULT_OCR_POLL_INTERVAL_MS,
            ),
            ocr_max_poll_attempts: parsed_or(
                &lookup,
                "OCR_MAX_POLL_ATTEMPTS",
                DEFAULT_OCR_MAX_POLL_ATTEMPTS,
            ),
            ocr_max_poll_delay_secs: parsed_or(
                &lookup,
                "OCR_MAX_POLL_DELAY_SECS",
                DEFAULT_OCR_MAX_POLL_DELAY_SECS,
            ),
            azure_openai_endpoint: required(&lookup, "AZURE_OPENAI_ENDPOINT")?,
            azure_openai_key: required(&lookup, "AZURE_OPENAI_KEY")?,
            azure_openai_deployment: lookup("AZURE_OPENAI_DEPLOYMENT")
                .unwrap_or_else(|| DEFAULT_OPENAI_DEPLOYMENT.to_string()),
            azure_openai_api_version: lookup("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|| DEFAULT_OPENAI_API_VERSION.to_string()),
            summary_max_tokens: parsed_or(&lookup, "SUMMARY_MAX_TOKENS", DEFAULT_SUMMARY_MAX_TOKENS),
            http_timeout_secs: parsed_or(&lookup, "HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS),
            max_upload_size_bytes,
            allowed_extensions: split_list(
                &lookup("ALLOWED_EXTENSIONS")
                    .unwrap_or_else(|| DEFAULT_ALLOWED_EXTENSIONS.to_string()),
            ),
            upload_temp_dir: lookup("UPLOAD_TEMP_DIR")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.storage_backend {
            StorageBackend::Azure => {
                if self.azure_storage_connection_string.is_none() {
                    return Err(anyhow::anyhow!(
                        "AZURE_STORAGE_CONNECTION_STRING must be set when using Azure storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        for (name, endpoint) in [
            ("DOCUMENT_INTELLIGENCE_ENDPOINT", &self.document_intelligence_endpoint),
            ("AZURE_OPENAI_ENDPOINT", &self.azure_openai_endpoint),
        ] {
            if !endpoint.starts_with("https://") && !endpoint.starts_with("http://") {
                return Err(anyhow::anyhow!("{} must be an http(s) URL", name));
            }
        }

        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB cannot be 0"));
        }
        if self.http_timeout_secs == 0 {
            return Err(anyhow::anyhow!("HTTP_TIMEOUT_SECS cannot be 0"));
        }
        if self.ocr_max_poll_attempts == 0 {
            return Err(anyhow::anyhow!("OCR_MAX_POLL_ATTEMPTS cannot be 0"));
        }
        if self.summary_max_tokens == 0 {
            return Err(anyhow::anyhow!("SUMMARY_MAX_TOKENS cannot be 0"));
        }
        if self.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_EXTENSIONS cannot be empty"));
        }
        if !matches!(self.log_format.as_str(), "compact" | "json") {
            return Err(anyhow::anyhow!("LOG_FORMAT must be 'compact' or 'json'"));
        }

        Ok(())
    }
}

// Keys and connection strings never reach logs.
impl Debug for SummarizerConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SummarizerConfig")
            .field("server_port", &self.server_port)
            .field("environment", &self.environment)
            .field("cors_origins", &self.cors_origins)
            .field("storage_backend", &self.storage_backend)
            .field(
                "azure_storage_connection_string",
                &self.azure_storage_connection_string.as_ref().map(|_| "<redacted>"),
            )
            .field("local_storage_path", &self.local_storage_path)
            .field("blob_container", &self.blob_container)
            .field("document_intelligence_endpoint", &self.document_intelligence_endpoint)
            .field("document_intelligence_key", &"<redacted>")
            .field("document_intelligence_model", &self.document_intelligence_model)
            .field("azure_openai_endpoint", &self.azure_openai_endpoint)
            .field("azure_openai_key", &"<redacted>")
            .field("azure_openai_deployment", &self.azure_openai_deployment)
            .field("summary_max_tokens", &self.summary_max_tokens)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("max_upload_size_bytes", &self.max_upload_size_bytes)
            .finish_non_exhaustive()
    }
}
