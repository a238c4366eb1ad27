//! Configuration validation
//!
//! `Config` already rejects missing or malformed values; this adds the checks that
//! depend on the deployment (production) and on the local filesystem.

use anyhow::{Context, Result};
use docsum_core::{Config, StorageBackend};

/// Validate critical configuration values
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    let is_production = config.is_production();

    if is_production && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production - this is a security risk. \
            Please set specific allowed origins via CORS_ORIGINS environment variable."
        ));
    }

    if is_production && config.storage_backend() == StorageBackend::Local {
        tracing::warn!(
            "Local storage backend in production - Document Intelligence must be able to reach LOCAL_STORAGE_BASE_URL"
        );
    }

    for endpoint in [
        config.document_intelligence_endpoint(),
        config.azure_openai_endpoint(),
    ] {
        if is_production && endpoint.starts_with("http://") {
            tracing::warn!(endpoint = %endpoint, "Plain HTTP service endpoint in production");
        }
    }

    let temp_dir = config.upload_temp_dir();
    std::fs::create_dir_all(&temp_dir).with_context(|| {
        format!(
            "UPLOAD_TEMP_DIR {} does not exist and cannot be created",
            temp_dir.display()
        )
    })?;

    Ok(())
}
