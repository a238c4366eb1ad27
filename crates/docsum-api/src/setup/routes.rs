//! Route configuration and setup.

use crate::constants::MULTIPART_OVERHEAD_BYTES;
use crate::error::HttpAppError;
use crate::handlers;
use crate::state::AppState;
use axum::{
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method},
    routing::{get, post},
    BoxError, Json, Router,
};
use docsum_core::{AppError, Config};
use docsum_infra::{request_id_middleware, RequestIdMakeSpan};
use std::sync::Arc;
use std::time::Duration;
use tower::limit::ConcurrencyLimitLayer;
use tower::timeout::{error::Elapsed, TimeoutLayer};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa_rapidoc::RapiDoc;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let http_concurrency_limit = config.http_concurrency_limit().max(1);
    tracing::info!(http_concurrency_limit, "HTTP concurrency limit layer enabled");

    let request_timeout_secs = config.request_timeout_secs().max(1);
    tracing::info!(request_timeout_secs, "Request timeout layer enabled");

    let body_limit = config
        .max_upload_size_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let app = api_routes()
        .merge(RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .layer(TimeoutLayer::new(Duration::from_secs(request_timeout_secs))),
        )
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(RequestIdMakeSpan))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::home::home))
        .route("/upload", post(handlers::upload::upload_document))
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
}

/// Render an elapsed request timeout through the regular error body.
async fn handle_timeout_error(err: BoxError) -> HttpAppError {
    if err.is::<Elapsed>() {
        HttpAppError(AppError::Timeout(
            "Request exceeded REQUEST_TIMEOUT_SECS".to_string(),
        ))
    } else {
        HttpAppError(AppError::Internal(format!("Unhandled middleware error: {}", err)))
    }
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static("x-request-id")]);

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        base.allow_origin(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin {}: {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        base.allow_origin(origins)
    };

    Ok(cors)
}
