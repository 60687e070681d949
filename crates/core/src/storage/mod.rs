//! Storage sinks for archived trigger responses.
//!
//! A sink writes a string verbatim under a `/`-separated key, creating any
//! intermediate directories or prefixes and overwriting what is already there.
//! The backend is picked once from configuration by [`create_storage_sink`].

mod local;
mod object;

pub use local::LocalStorageSink;
pub use object::ObjectStoreSink;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{StorageConfig, StorageMode};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload of {key} failed: {reason}")]
    UploadFailed { key: String, reason: String },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage configuration error: {0}")]
    Configuration(String),
}

impl StorageError {
    pub fn upload_failed(key: &str, reason: impl ToString) -> Self {
        Self::UploadFailed {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Write-by-key capability shared by every storage backend.
#[async_trait]
pub trait StorageSink: Send + Sync {
    /// Returns the name of this sink implementation.
    fn name(&self) -> &str;

    /// Human-readable destination of a key (file path or object URL).
    fn location(&self, key: &str) -> String;

    /// Write `content` under `key`, replacing any previous content.
    async fn upload(&self, key: &str, content: &str) -> Result<(), StorageError>;
}

/// Factory function to create the configured storage sink
pub fn create_storage_sink(config: &StorageConfig) -> Result<Box<dyn StorageSink>, StorageError> {
    match config.mode {
        StorageMode::Local => Ok(Box::new(LocalStorageSink::new(&config.local.output_dir))),
        StorageMode::ObjectStore => {
            let os_config = config.object_store.as_ref().ok_or_else(|| {
                StorageError::Configuration(
                    "storage.object_store must be set when using object_store mode".to_string(),
                )
            })?;
            Ok(Box::new(ObjectStoreSink::from_config(os_config)?))
        }
    }
}
