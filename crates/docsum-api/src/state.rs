//! Application state shared by all handlers.

use crate::pipeline::DocumentPipeline;
use docsum_core::Config;

/// Built once at startup and shared through `Arc`; nothing in it changes per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: DocumentPipeline,
}

impl AppState {
    pub fn new(config: Config, pipeline: DocumentPipeline) -> Self {
        Self { config, pipeline }
    }
}
