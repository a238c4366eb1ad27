//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;

/// Returns the OpenAPI document served at `/api/openapi.json`.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Docsum API",
        version = "0.1.0",
        description = "Upload a document to get a key-point summary. Documents are stored in Azure Blob Storage, read with Azure AI Document Intelligence and summarized with Azure OpenAI."
    ),
    paths(
        handlers::home::home,
        handlers::health::health_check,
        handlers::upload::upload_document,
    ),
    components(schemas(
        ErrorResponse,
        handlers::upload::SummaryResponse,
        handlers::health::HealthResponse,
    )),
    tags(
        (name = "documents", description = "Document summarization"),
        (name = "service", description = "Service banner and health")
    )
)]
pub struct ApiDoc;
