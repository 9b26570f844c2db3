use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use shared::domain::Filename;
use tokio::fs;
use tracing::debug;

/// Disk-backed store for uploaded images.
///
/// Filenames are pre-sanitized [`Filename`] values, so every stored file
/// lives directly under the root directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl UploadStore {
    /// Open the store, creating the upload directory if it does not exist.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.with_context(|| {
            format!("failed to create upload directory '{}'", root.display())
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, filename: &Filename) -> PathBuf {
        self.root.join(filename.as_str())
    }

    pub async fn save(&self, filename: &Filename, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(filename);
        fs::write(&path, bytes)
            .await
            .with_context(|| format!("failed to write upload '{}'", path.display()))?;
        debug!(filename = %filename, size_bytes = bytes.len(), "stored upload");
        Ok(())
    }

    pub async fn load(&self, filename: &Filename) -> Result<Option<StoredUpload>> {
        let path = self.path_for(filename);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(StoredUpload {
                bytes,
                content_type: content_type_for(filename),
            })),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => {
                Err(err).with_context(|| format!("failed to read upload '{}'", path.display()))
            }
        }
    }
}

fn content_type_for(filename: &Filename) -> String {
    mime_guess::from_path(filename.as_str())
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
