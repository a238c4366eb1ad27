//! Docsum Infrastructure Library
//!
//! Shared infrastructure for the docsum service:
//! - Middleware (request ID)
//! - Telemetry initialization (tracing-subscriber)

#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

// Re-export commonly used types
#[cfg(feature = "middleware")]
pub use middleware::{
    get_request_id, request_id_middleware, RequestId, RequestIdMakeSpan, REQUEST_ID_HEADER,
};

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry, LogFormat};
