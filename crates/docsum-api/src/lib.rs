//! Docsum API Library
//!
//! HTTP surface of the document summarizer: an upload is stored in blob storage,
//! its text extracted by Document Intelligence and summarized by Azure OpenAI.

mod api_doc;
pub mod constants;
pub mod error;
mod handlers;
pub mod pipeline;
pub mod setup;
pub mod state;
pub mod utils;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use handlers::{HealthResponse, SummaryResponse};
pub use pipeline::{DocumentPipeline, PipelineError};
pub use state::AppState;
