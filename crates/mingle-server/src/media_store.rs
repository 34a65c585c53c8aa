//! Disk-backed store for uploaded media files.
//!
//! Files are stored under a UUID name plus a sanitised extension; the
//! client-supplied name is never used as a path component.

use std::path::PathBuf;

use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ServerError;

#[derive(Debug, Clone)]
pub struct MediaStore {
    base_path: PathBuf,
    max_size: usize,
}

impl MediaStore {
    pub async fn new(base_path: PathBuf, max_size: usize) -> Result<Self, ServerError> {
        fs::create_dir_all(&base_path).await.map_err(|e| {
            ServerError::Storage(format!(
                "Failed to create upload directory '{}': {}",
                base_path.display(),
                e
            ))
        })?;

        info!(path = %base_path.display(), "Media store initialized");

        Ok(Self {
            base_path,
            max_size,
        })
    }

    /// Persist an upload and return the stored file name.
    pub async fn store_file(
        &self,
        original_name: &str,
        data: &[u8],
    ) -> Result<String, ServerError> {
        if data.is_empty() {
            return Err(ServerError::BadRequest("Empty upload".to_string()));
        }
        if data.len() > self.max_size {
            return Err(ServerError::UploadTooLarge {
                size: data.len(),
                max: self.max_size,
            });
        }

        let name = match sanitize_extension(original_name) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };

        let path = self.base_path.join(&name);
        fs::write(&path, data)
            .await
            .map_err(|e| ServerError::Storage(format!("Failed to write '{name}': {e}")))?;

        debug!(name = %name, size = data.len(), "Stored upload");
        Ok(name)
    }

    /// Read a stored file back by its stored name.
    pub async fn get_file(&self, name: &str) -> Result<Vec<u8>, ServerError> {
        validate_stored_name(name)?;

        let path = self.base_path.join(name);
        if !path.exists() {
            return Err(ServerError::FileNotFound(name.to_string()));
        }

        let data = fs::read(&path)
            .await
            .map_err(|e| ServerError::Storage(format!("Failed to read '{name}': {e}")))?;

        debug!(name = %name, size = data.len(), "Retrieved upload");
        Ok(data)
    }
}

/// Extract a safe lowercase extension from the client-supplied file name.
fn sanitize_extension(original_name: &str) -> Option<String> {
    let ext = original_name.rsplit('.').next()?;
    if ext.is_empty() || ext.len() > 8 || ext == original_name {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Stored names are `<uuid>` or `<uuid>.<ext>`; anything else (separators,
/// parent components) is rejected before touching the filesystem.
fn validate_stored_name(name: &str) -> Result<(), ServerError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
    if !valid || name.contains("..") {
        return Err(ServerError::BadRequest("Invalid file name".to_string()));
    }
    Ok(())
}
