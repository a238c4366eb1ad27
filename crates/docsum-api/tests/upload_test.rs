mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use bytes::Bytes;
use docsum_services::{ExtractError, SummarizeError};
use helpers::*;
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn test_upload_returns_summary() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/upload")
        .multipart(file_form("report.pdf", b"%PDF-1.7 quarterly"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<serde_json::Value>(),
        json!({"filename": "report.pdf", "summary": SUMMARY})
    );

    assert_eq!(
        app.store.blob("uploads", "report.pdf"),
        Some(Bytes::from_static(b"%PDF-1.7 quarterly"))
    );
    assert_eq!(app.extractor.calls(), vec!["mem://uploads/report.pdf"]);
    assert_eq!(app.summarizer.calls(), vec![EXTRACTED_TEXT]);
}

#[tokio::test]
async fn test_upload_stages_file_and_cleans_up() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/upload")
        .multipart(file_form("scan.png", b"\x89PNG"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);

    let staged = app.store.staged.lock().unwrap().clone();
    assert_eq!(staged.len(), 1);
    let (path, existed) = &staged[0];
    assert!(existed, "file should exist while it is uploaded");
    assert!(path.starts_with(&app.temp_root));
    assert!(!path.exists());
    assert_eq!(app.staged_leftovers(), 0);
}

#[tokio::test]
async fn test_upload_keeps_client_filename_in_response() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/upload")
        .multipart(file_form(r"C:\docs\Q3 report.pdf", b"%PDF"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["filename"], r"C:\docs\Q3 report.pdf");
    assert!(app.store.blob("uploads", "Q3_report.pdf").is_some());
}

#[tokio::test]
async fn test_upload_same_name_overwrites_blob() {
    let app = setup_test_app().await;

    for content in [&b"first"[..], &b"second"[..]] {
        let response = app
            .client()
            .post("/upload")
            .multipart(file_form("notes.pdf", content))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    assert_eq!(app.store.blob_count(), 1);
    assert_eq!(
        app.store.blob("uploads", "notes.pdf"),
        Some(Bytes::from_static(b"second"))
    );
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let app = setup_test_app().await;

    let form = MultipartForm::new().add_text("note", "no document attached");
    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<serde_json::Value>(),
        json!({"error": "No file provided"})
    );
    assert!(app.extractor.calls().is_empty());
}

#[tokio::test]
async fn test_upload_text_field_named_file_is_not_a_file() {
    let app = setup_test_app().await;

    let form = MultipartForm::new().add_text("file", "report.pdf");
    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<serde_json::Value>(),
        json!({"error": "No file provided"})
    );
}

#[tokio::test]
async fn test_upload_non_multipart_body() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/upload")
        .json(&json!({"file": "report.pdf"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<serde_json::Value>(),
        json!({"error": "No file provided"})
    );
}

#[tokio::test]
async fn test_upload_empty_filename() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/upload")
        .multipart(file_form("", b""))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<serde_json::Value>(),
        json!({"error": "No selected file"})
    );
    assert_eq!(app.store.blob_count(), 0);
}

#[tokio::test]
async fn test_upload_unsupported_extension() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/upload")
        .multipart(file_form("installer.exe", b"MZ"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<serde_json::Value>(),
        json!({"error": "Unsupported file type"})
    );
    assert_eq!(app.store.blob_count(), 0);
}

#[tokio::test]
async fn test_upload_empty_file() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/upload")
        .multipart(file_form("empty.pdf", b""))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<serde_json::Value>(),
        json!({"error": "File is empty"})
    );
}

#[tokio::test]
async fn test_upload_multiple_files_rejected() {
    let app = setup_test_app().await;

    let form = file_form("a.pdf", b"one").add_part(
        "file",
        Part::bytes(Bytes::from_static(b"two"))
            .file_name("b.pdf")
            .mime_type("application/pdf"),
    );
    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(app.store.blob_count(), 0);
}

#[tokio::test]
async fn test_upload_over_size_limit() {
    let app = setup_test_app().await;

    // One byte over the 1 MB test limit, still under the transport limit.
    let data = vec![b'a'; 1024 * 1024 + 1];
    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(Bytes::from(data))
            .file_name("big.pdf")
            .mime_type("application/pdf"),
    );
    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = response.json::<serde_json::Value>();
    assert!(body["error"].as_str().unwrap().contains("1 MB"));
    assert_eq!(app.store.blob_count(), 0);
}

#[tokio::test]
async fn test_upload_body_over_transport_limit() {
    let app = setup_test_app().await;

    let data = vec![b'a'; 2 * 1024 * 1024];
    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(Bytes::from(data))
            .file_name("huge.pdf")
            .mime_type("application/pdf"),
    );
    let response = app
        .client()
        .post("/upload")
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(app.store.blob_count(), 0);
}

#[tokio::test]
async fn test_storage_failure_is_bad_gateway() {
    let app = setup_test_app_with(
        MockBlobStore::unavailable(),
        MockExtractor::returning(EXTRACTED_TEXT),
        MockSummarizer::returning(SUMMARY),
    )
    .await;

    let response = app
        .client()
        .post("/upload")
        .multipart(file_form("report.pdf", b"%PDF"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["code"], "STORAGE_UNAVAILABLE");
    assert!(!body.to_string().contains("os error"));
    assert!(app.extractor.calls().is_empty());
    assert_eq!(app.staged_leftovers(), 0);
}

#[tokio::test]
async fn test_extraction_auth_failure_stops_pipeline() {
    let app = setup_test_app_with(
        MockBlobStore::default(),
        MockExtractor::with(|| {
            Err(ExtractError::Auth(
                "401 Access denied due to invalid subscription key".to_string(),
            ))
        }),
        MockSummarizer::returning(SUMMARY),
    )
    .await;

    let response = app
        .client()
        .post("/upload")
        .multipart(file_form("report.pdf", b"%PDF"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        response.json::<serde_json::Value>(),
        json!({
            "error": "Upstream service rejected credentials",
            "code": "UPSTREAM_AUTH_FAILED"
        })
    );
    assert!(app.summarizer.calls().is_empty());
    assert_eq!(app.staged_leftovers(), 0);
}

#[tokio::test]
async fn test_failed_analysis_is_bad_gateway() {
    let app = setup_test_app_with(
        MockBlobStore::default(),
        MockExtractor::with(|| Err(ExtractError::Analysis("status failed".to_string()))),
        MockSummarizer::returning(SUMMARY),
    )
    .await;

    let response = app
        .client()
        .post("/upload")
        .multipart(file_form("report.pdf", b"%PDF"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        response.json::<serde_json::Value>()["code"],
        "EXTRACTION_FAILED"
    );
}

#[tokio::test]
async fn test_empty_extraction_still_summarized() {
    let app = setup_test_app_with(
        MockBlobStore::default(),
        MockExtractor::returning(""),
        MockSummarizer::returning("Nothing to summarize."),
    )
    .await;

    let response = app
        .client()
        .post("/upload")
        .multipart(file_form("blank.png", b"\x89PNG"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(app.summarizer.calls(), vec![String::new()]);
}

#[tokio::test]
async fn test_malformed_completion_is_bad_gateway() {
    let app = setup_test_app_with(
        MockBlobStore::default(),
        MockExtractor::returning(EXTRACTED_TEXT),
        MockSummarizer::with(|| {
            Err(SummarizeError::MalformedResponse(
                "Completion has no first choice with content".to_string(),
            ))
        }),
    )
    .await;

    let response = app
        .client()
        .post("/upload")
        .multipart(file_form("report.pdf", b"%PDF"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        response.json::<serde_json::Value>()["code"],
        "MALFORMED_UPSTREAM_RESPONSE"
    );
    assert_eq!(app.staged_leftovers(), 0);
}

#[tokio::test]
async fn test_request_timeout_is_structured() {
    let app = setup_test_app_with_config(
        &[("REQUEST_TIMEOUT_SECS", "1")],
        MockBlobStore::default(),
        MockExtractor::returning(EXTRACTED_TEXT).delayed(Duration::from_secs(3)),
        MockSummarizer::returning(SUMMARY),
    )
    .await;

    let response = app
        .client()
        .post("/upload")
        .multipart(file_form("slow.pdf", b"%PDF"))
        .await;

    assert_eq!(response.status_code(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(
        response.json::<serde_json::Value>(),
        json!({"error": "Request timed out", "code": "REQUEST_TIMEOUT"})
    );
    assert!(app.summarizer.calls().is_empty());
    assert_eq!(app.staged_leftovers(), 0);
}
