//! Object store sink (S3 and compatible services).

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use object_store::{
    aws::AmazonS3Builder, path::Path as ObjectPath, Attribute, AttributeValue, Attributes,
    ObjectStore, PutOptions, PutPayload,
};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::debug;

use crate::config::ObjectStoreConfig;

use super::{StorageError, StorageSink};

/// Writes each key verbatim as an object key in one bucket.
pub struct ObjectStoreSink {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl std::fmt::Debug for ObjectStoreSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreSink")
            .field("bucket", &self.bucket)
            .finish()
    }
}

impl ObjectStoreSink {
    /// Wrap any object store. `bucket` is only used for display.
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    /// Build an S3 sink. Credentials come from the standard AWS environment
    /// unless static keys are configured.
    pub fn from_config(config: &ObjectStoreConfig) -> Result<Self, StorageError> {
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region)
            .with_allow_http(config.allow_http);

        if let Some(endpoint) = config.endpoint.as_deref() {
            builder = builder.with_endpoint(endpoint);
        }

        if let (Some(key_id), Some(secret)) = (
            config.access_key_id.as_deref(),
            config.secret_access_key.as_deref(),
        ) {
            builder = builder
                .with_access_key_id(key_id)
                .with_secret_access_key(secret);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::Configuration(e.to_string()))?;

        Ok(Self::new(Arc::new(store), config.bucket.clone()))
    }
}

/// Content type guessed from the key extension.
fn content_type_for(key: &str) -> &'static str {
    match key.rsplit_once('.').map(|(_, ext)| ext) {
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

fn object_attributes(key: &str) -> Attributes {
    Attributes::from_iter([
        (
            Attribute::ContentType,
            AttributeValue::from(content_type_for(key)),
        ),
        (
            Attribute::Metadata(Cow::Borrowed("archived_at")),
            AttributeValue::from(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        ),
    ])
}

#[async_trait]
impl StorageSink for ObjectStoreSink {
    fn name(&self) -> &str {
        "object_store"
    }

    fn location(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }

    async fn upload(&self, key: &str, content: &str) -> Result<(), StorageError> {
        let path = ObjectPath::parse(key).map_err(|_| StorageError::InvalidKey(key.to_string()))?;

        let opts = PutOptions {
            attributes: object_attributes(key),
            ..Default::default()
        };

        self.store
            .put_opts(&path, PutPayload::from(content.as_bytes().to_vec()), opts)
            .await
            .map_err(|e| StorageError::upload_failed(key, e))?;

        debug!(bucket = %self.bucket, key, bytes = content.len(), "Put archive object");
        Ok(())
    }
}
