//! Error types module
//!
//! All request-level failures are unified under [`AppError`]. Each variant describes
//! how it is presented over HTTP through [`ErrorMetadata`], so handlers never decide
//! status codes or client messages themselves.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for failures of upstream services outside our control
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "STORAGE_UNAVAILABLE")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details must never be sent to the client
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Blob storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Upstream credentials rejected: {0}")]
    UpstreamAuth(String),

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Summarization failed: {0}")]
    Summarization(String),

    #[error("Malformed upstream response: {0}")]
    MalformedUpstream(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

/// Static metadata per variant: (http_status, error_code, recoverable, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, bool, LogLevel) {
    match err {
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, false, LogLevel::Debug),
        AppError::PayloadTooLarge(_) => (413, "PAYLOAD_TOO_LARGE", false, false, LogLevel::Debug),
        AppError::StorageUnavailable(_) => (502, "STORAGE_UNAVAILABLE", true, true, LogLevel::Error),
        AppError::UpstreamAuth(_) => (502, "UPSTREAM_AUTH_FAILED", false, true, LogLevel::Error),
        AppError::Extraction(_) => (502, "EXTRACTION_FAILED", true, true, LogLevel::Warn),
        AppError::Summarization(_) => (502, "SUMMARIZATION_FAILED", true, true, LogLevel::Warn),
        AppError::MalformedUpstream(_) => (502, "MALFORMED_UPSTREAM_RESPONSE", true, true, LogLevel::Error),
        AppError::Timeout(_) => (504, "REQUEST_TIMEOUT", true, true, LogLevel::Warn),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => {
            (500, "INTERNAL_ERROR", true, true, LogLevel::Error)
        }
    }
}

impl AppError {
    /// Get the error type name for log fields
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::StorageUnavailable(_) => "StorageUnavailable",
            AppError::UpstreamAuth(_) => "UpstreamAuth",
            AppError::Extraction(_) => "Extraction",
            AppError::Summarization(_) => "Summarization",
            AppError::MalformedUpstream(_) => "MalformedUpstream",
            AppError::Timeout(_) => "Timeout",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::StorageUnavailable(_) => "Document storage is unavailable".to_string(),
            AppError::UpstreamAuth(_) => "Upstream service rejected credentials".to_string(),
            AppError::Extraction(_) => "Text extraction failed".to_string(),
            AppError::Summarization(_) => "Summarization failed".to_string(),
            AppError::MalformedUpstream(_) => {
                "Upstream service returned an unexpected response".to_string()
            }
            AppError::Timeout(_) => "Request timed out".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}
