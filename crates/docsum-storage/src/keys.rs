//! Shared key and container validation for storage backends.

use std::path::Path;

use crate::traits::{StorageError, StorageResult};

/// Derive the blob key for a local file: its base name.
pub fn blob_key_for(local_path: &Path) -> StorageResult<String> {
    let key = local_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            StorageError::InvalidKey(format!(
                "Path has no usable file name: {}",
                local_path.display()
            ))
        })?;
    validate_key(key)?;
    Ok(key.to_string())
}

/// Keys must be non-empty and must not contain `..`, a leading `/` or a backslash.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Blob key is empty".to_string()));
    }
    if key.contains("..") || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(
            "Blob key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// Azure container naming rules: 3-63 chars, lowercase letters, digits and single
/// hyphens, starting and ending with a letter or digit.
pub fn validate_container(container: &str) -> StorageResult<()> {
    let valid_len = (3..=63).contains(&container.len());
    let valid_chars = container
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    let valid_edges = !container.starts_with('-') && !container.ends_with('-');
    if valid_len && valid_chars && valid_edges && !container.contains("--") {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(format!(
            "Invalid container name: {}",
            container
        )))
    }
}

/// Join a base URL, container and key into a blob URL, percent-encoding the key.
pub fn blob_url(base_url: &str, container: &str, key: &str) -> String {
    format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        container,
        urlencoding::encode(key)
    )
}
