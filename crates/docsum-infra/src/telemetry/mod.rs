//! Tracing initialization
//!
//! Structured logs go to stdout through `tracing-subscriber`, either human-readable
//! (`compact`) or one JSON object per line (`json`) for log shippers.

mod init_basic;

pub use init_basic::{init_telemetry, shutdown_telemetry, LogFormat};
