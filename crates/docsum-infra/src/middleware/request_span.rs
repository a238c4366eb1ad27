use axum::extract::MatchedPath;
use axum::http::Request;
use tower_http::trace::MakeSpan;
use tracing::Span;

use super::request_id::get_request_id;

/// Span factory for `TraceLayer` that tags every request span with its request id.
///
/// Must sit inside the request id middleware so the id is already in the extensions.
/// Handler and pipeline events are recorded inside this span, so they carry the id too.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestIdMakeSpan;

impl<B> MakeSpan<B> for RequestIdMakeSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let uri = request.uri().path();
        let route = request
            .extensions()
            .get::<MatchedPath>()
            .map(|mp| mp.as_str())
            .unwrap_or(uri);
        let request_id = get_request_id(request).unwrap_or_default();

        tracing::info_span!(
            "http_request",
            method = %request.method(),
            route = %route,
            request_id = %request_id,
        )
    }
}
