use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::{
    extract_upload_file, sanitize_filename, validate_file_extension, validate_file_size,
};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use docsum_core::AppError;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryResponse {
    /// Filename as submitted by the client
    pub filename: String,
    pub summary: String,
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "documents",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Form with one file part named `file`"),
    responses(
        (status = 200, description = "Document summarized", body = SummaryResponse),
        (status = 400, description = "Missing, empty or unsupported file", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 502, description = "Storage, OCR or summarization service failed", body = ErrorResponse),
        (status = 504, description = "Request timed out", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_document"))]
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SummaryResponse>, HttpAppError> {
    // A body that is not multipart/form-data carries no file at all.
    let multipart = multipart.map_err(|rejection| {
        tracing::debug!(rejection = %rejection.body_text(), "Upload body is not multipart");
        AppError::InvalidInput("No file provided".to_string())
    })?;
    let upload = extract_upload_file(multipart).await?;

    validate_file_size(upload.data.len(), state.config.max_upload_size_bytes())?;
    let safe_name = sanitize_filename(&upload.filename)?;
    let extension = validate_file_extension(&safe_name, state.config.allowed_extensions())?;

    tracing::info!(
        filename = %upload.filename,
        stored_as = %safe_name,
        extension = %extension,
        size_bytes = upload.data.len(),
        "Document upload received"
    );

    let summary = state
        .pipeline
        .summarize_upload(&safe_name, upload.data)
        .await?;

    Ok(Json(SummaryResponse {
        filename: upload.filename,
        summary,
    }))
}
