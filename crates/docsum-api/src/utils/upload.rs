//! Multipart upload extraction and validation

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::Bytes;
use docsum_core::AppError;

use crate::constants::FILE_FIELD;

const MAX_FILENAME_LENGTH: usize = 255;

/// The single document carried by an upload request
#[derive(Debug)]
pub struct UploadedFile {
    /// Filename exactly as the client submitted it
    pub filename: String,
    pub data: Bytes,
}

fn multipart_error(err: MultipartError, context: &str) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("File exceeds the maximum upload size".to_string())
    } else {
        AppError::InvalidInput(format!("{}: {}", context, err.body_text()))
    }
}

/// Extract the `file` part from a multipart form.
///
/// Only parts that carry a filename count as files; a plain form field named `file`
/// is ignored. No file part → "No file provided"; a file part with an empty filename
/// (a form submitted without choosing a file) → "No selected file". More than one
/// file part is rejected.
pub async fn extract_upload_file(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Failed to read multipart"))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        if upload.is_some() {
            return Err(AppError::InvalidInput(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            ));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, "Failed to read file data"))?;

        upload = Some(UploadedFile { filename, data });
    }

    let upload = upload.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;

    if upload.filename.is_empty() {
        return Err(AppError::InvalidInput("No selected file".to_string()));
    }

    Ok(upload)
}

/// Validate file size
pub fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size == 0 {
        return Err(AppError::InvalidInput("File is empty".to_string()));
    }
    if file_size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} MB",
            max_size / 1024 / 1024
        )));
    }
    Ok(())
}

/// Validate file extension against the allowlist; returns the lowercased extension.
pub fn validate_file_extension(
    filename: &str,
    allowed_extensions: &[String],
) -> Result<String, AppError> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    if extension.is_empty() || !allowed_extensions.contains(&extension) {
        return Err(AppError::InvalidInput("Unsupported file type".to_string()));
    }

    Ok(extension)
}

/// Reduce a client filename to a safe base name.
///
/// Client paths (`C:\Users\me\report.pdf`, `docs/report.pdf`) keep only their last
/// component; characters other than alphanumerics, `.`, `-` and `_` become `_`.
/// Names containing `..` are rejected.
pub fn sanitize_filename(filename: &str) -> Result<String, AppError> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    if base.contains("..") {
        return Err(AppError::InvalidInput(
            "Filename contains invalid path traversal".to_string(),
        ));
    }

    let sanitized: String = base
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches(['.', '_']).is_empty() {
        return Err(AppError::InvalidInput("Invalid filename".to_string()));
    }

    Ok(sanitized)
}
