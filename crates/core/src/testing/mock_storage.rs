//! Mock storage sink for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::storage::{StorageError, StorageSink};

/// In-memory storage sink that records every upload.
#[derive(Debug, Default)]
pub struct MockStorageSink {
    objects: Arc<RwLock<HashMap<String, String>>>,
    /// Keys in upload order, repeats included.
    uploads: Arc<RwLock<Vec<String>>>,
    failing_keys: Arc<RwLock<HashSet<String>>>,
}

impl MockStorageSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every upload to `key` fail.
    pub async fn fail_on(&self, key: &str) {
        self.failing_keys.write().await.insert(key.to_string());
    }

    pub async fn content(&self, key: &str) -> Option<String> {
        self.objects.read().await.get(key).cloned()
    }

    /// Distinct keys in first-upload order.
    pub async fn keys(&self) -> Vec<String> {
        let uploads = self.uploads.read().await;
        let mut seen = HashSet::new();
        let keys = uploads
            .iter()
            .filter(|k| seen.insert(k.as_str()))
            .cloned()
            .collect();
        keys
    }

    /// Total number of successful uploads, repeats included.
    pub async fn upload_count(&self) -> usize {
        self.uploads.read().await.len()
    }
}

#[async_trait]
impl StorageSink for MockStorageSink {
    fn name(&self) -> &str {
        "mock"
    }

    fn location(&self, key: &str) -> String {
        format!("mock://{key}")
    }

    async fn upload(&self, key: &str, content: &str) -> Result<(), StorageError> {
        if self.failing_keys.read().await.contains(key) {
            return Err(StorageError::upload_failed(key, "simulated storage failure"));
        }

        self.objects
            .write()
            .await
            .insert(key.to_string(), content.to_string());
        self.uploads.write().await.push(key.to_string());
        Ok(())
    }
}
