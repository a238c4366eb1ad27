//! Fixed response texts and limits of the HTTP API.

/// Body of `GET /`.
pub const HOME_MESSAGE: &str = "Welcome to the Azure Document Summarizer API";

/// Multipart field carrying the uploaded document.
pub const FILE_FIELD: &str = "file";

/// Allowance for multipart boundaries and part headers on top of the file size limit.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;
