//! Local filesystem sink.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::{StorageError, StorageSink};

/// Writes each key as a file below a base directory.
///
/// Writes are plain overwrites; there is no temp-file rename.
pub struct LocalStorageSink {
    base_dir: PathBuf,
}

impl LocalStorageSink {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve a key below the base directory, refusing anything that escapes it.
    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_plain {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.base_dir.join(relative))
    }
}

#[async_trait]
impl StorageSink for LocalStorageSink {
    fn name(&self) -> &str {
        "local"
    }

    fn location(&self, key: &str) -> String {
        self.base_dir.join(key).display().to_string()
    }

    async fn upload(&self, key: &str, content: &str) -> Result<(), StorageError> {
        let path = self.resolve(key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::upload_failed(key, e))?;
        }

        fs::write(&path, content.as_bytes())
            .await
            .map_err(|e| StorageError::upload_failed(key, e))?;

        debug!(path = %path.display(), bytes = content.len(), "Wrote archive file");
        Ok(())
    }
}
