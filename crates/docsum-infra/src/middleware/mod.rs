//! Shared HTTP middleware for docsum

pub mod request_id;
pub mod request_span;

pub use request_id::{get_request_id, request_id_middleware, RequestId, REQUEST_ID_HEADER};
pub use request_span::RequestIdMakeSpan;
