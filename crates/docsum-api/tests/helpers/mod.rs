#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use bytes::Bytes;
use docsum_api::setup::routes::setup_routes;
use docsum_api::{AppState, DocumentPipeline};
use docsum_core::{Config, SummarizerConfig};
use docsum_services::{ExtractError, SummarizeError, Summarizer, TextExtractor};
use docsum_storage::{BlobStore, StorageBackend, StorageError, StorageResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

pub const EXTRACTED_TEXT: &str = "Quarterly revenue rose 12%.\nCosts were flat.";
pub const SUMMARY: &str = "- Revenue up 12%\n- Costs flat";

/// In-memory blob store keeping the last write per (container, key)
#[derive(Default)]
pub struct MockBlobStore {
    pub blobs: Mutex<HashMap<(String, String), Bytes>>,
    /// Staged paths seen by `upload_file`, with whether the file existed at the time
    pub staged: Mutex<Vec<(PathBuf, bool)>>,
    pub unavailable: bool,
}

impl MockBlobStore {
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    pub fn blob(&self, container: &str, key: &str) -> Option<Bytes> {
        self.blobs
            .lock()
            .unwrap()
            .get(&(container.to_string(), key.to_string()))
            .cloned()
    }

    pub fn blob_count(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }
}

#[async_trait]
impl BlobStore for MockBlobStore {
    async fn put(&self, container: &str, key: &str, data: Bytes) -> StorageResult<String> {
        if self.unavailable {
            return Err(StorageError::Connection(
                "connection refused (os error 111)".to_string(),
            ));
        }
        self.blobs
            .lock()
            .unwrap()
            .insert((container.to_string(), key.to_string()), data);
        Ok(format!("mem://{}/{}", container, key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }

    async fn upload_file(&self, local_path: &Path, container: &str) -> StorageResult<String> {
        self.staged
            .lock()
            .unwrap()
            .push((local_path.to_path_buf(), local_path.exists()));

        let key = local_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| StorageError::InvalidKey(local_path.display().to_string()))?
            .to_string();
        let data = tokio::fs::read(local_path).await?;
        self.put(container, &key, Bytes::from(data)).await
    }
}

type ExtractFn = Box<dyn Fn() -> Result<String, ExtractError> + Send + Sync>;

/// Text extractor recording every document URL it is asked to read
pub struct MockExtractor {
    respond: ExtractFn,
    delay: Option<Duration>,
    pub urls: Mutex<Vec<String>>,
}

impl MockExtractor {
    pub fn returning(text: &str) -> Self {
        let text = text.to_string();
        Self::with(move || Ok(text.clone()))
    }

    pub fn with(respond: impl Fn() -> Result<String, ExtractError> + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            delay: None,
            urls: Mutex::new(Vec::new()),
        }
    }

    /// Simulate a slow analysis job
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextExtractor for MockExtractor {
    async fn extract(&self, document_url: &str) -> Result<String, ExtractError> {
        self.urls.lock().unwrap().push(document_url.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.respond)()
    }
}

type SummarizeFn = Box<dyn Fn() -> Result<String, SummarizeError> + Send + Sync>;

/// Summarizer recording every text it is asked to summarize
pub struct MockSummarizer {
    respond: SummarizeFn,
    pub texts: Mutex<Vec<String>>,
}

impl MockSummarizer {
    pub fn returning(summary: &str) -> Self {
        let summary = summary.to_string();
        Self::with(move || Ok(summary.clone()))
    }

    pub fn with(
        respond: impl Fn() -> Result<String, SummarizeError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            texts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        self.texts.lock().unwrap().push(text.to_string());
        (self.respond)()
    }
}

/// Test application with mocked Azure services
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<MockBlobStore>,
    pub extractor: Arc<MockExtractor>,
    pub summarizer: Arc<MockSummarizer>,
    pub temp_root: PathBuf,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Number of entries left behind in the staging directory
    pub fn staged_leftovers(&self) -> usize {
        std::fs::read_dir(&self.temp_root)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// Create test configuration rooted in `temp_dir`; `overrides` replace the defaults
pub fn create_test_config(temp_dir: &Path, overrides: &[(&'static str, &str)]) -> Config {
    let mut vars: HashMap<&str, String> = HashMap::new();
    vars.insert("STORAGE_BACKEND", "local".to_string());
    vars.insert(
        "LOCAL_STORAGE_PATH",
        temp_dir.join("blobs").display().to_string(),
    );
    vars.insert("LOCAL_STORAGE_BASE_URL", "http://localhost:5000/blobs".to_string());
    vars.insert(
        "UPLOAD_TEMP_DIR",
        temp_dir.join("staging").display().to_string(),
    );
    vars.insert("MAX_UPLOAD_SIZE_MB", "1".to_string());
    vars.insert(
        "DOCUMENT_INTELLIGENCE_ENDPOINT",
        "https://ocr.invalid".to_string(),
    );
    vars.insert("DOCUMENT_INTELLIGENCE_KEY", "ocr-key".to_string());
    vars.insert("AZURE_OPENAI_ENDPOINT", "https://llm.invalid".to_string());
    vars.insert("AZURE_OPENAI_KEY", "llm-key".to_string());
    for (key, value) in overrides {
        vars.insert(*key, value.to_string());
    }

    let config = SummarizerConfig::from_vars(|key| vars.get(key).cloned())
        .expect("test configuration should be valid");
    Config(Box::new(config))
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(
        MockBlobStore::default(),
        MockExtractor::returning(EXTRACTED_TEXT),
        MockSummarizer::returning(SUMMARY),
    )
    .await
}

/// Setup a test application around the given service doubles
pub async fn setup_test_app_with(
    store: MockBlobStore,
    extractor: MockExtractor,
    summarizer: MockSummarizer,
) -> TestApp {
    setup_test_app_with_config(&[], store, extractor, summarizer).await
}

pub async fn setup_test_app_with_config(
    overrides: &[(&'static str, &str)],
    store: MockBlobStore,
    extractor: MockExtractor,
    summarizer: MockSummarizer,
) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(temp_dir.path(), overrides);

    let temp_root = config.upload_temp_dir();
    std::fs::create_dir_all(&temp_root).expect("Failed to create staging dir");

    let store = Arc::new(store);
    let extractor = Arc::new(extractor);
    let summarizer = Arc::new(summarizer);

    let pipeline = DocumentPipeline::new(
        store.clone(),
        extractor.clone(),
        summarizer.clone(),
        config.blob_container(),
        temp_root.clone(),
    );
    assert_eq!(pipeline.container(), "uploads");
    let temp_root = pipeline.temp_root().to_path_buf();
    let state = Arc::new(AppState::new(config.clone(), pipeline));

    let app = setup_routes(&config, state).expect("Failed to build router");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        store,
        extractor,
        summarizer,
        temp_root,
        _temp_dir: temp_dir,
    }
}

/// Multipart form with one `file` part
pub fn file_form(filename: &str, content: &'static [u8]) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(Bytes::from_static(content))
            .file_name(filename)
            .mime_type("application/octet-stream"),
    )
}
