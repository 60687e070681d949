use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub trigger: TriggerConfig,
    #[serde(default)]
    pub token: TokenConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
}

/// Client registry database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite registry database. Opened read-only.
    pub path: PathBuf,
    /// Query returning `(client_id, name[, credential_id])` rows in archive order.
    pub clients_query: String,
}

/// Trigger endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TriggerConfig {
    /// Base URL of the data-exchange service (e.g., "https://dex.example.com")
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

/// OAuth2 client-credentials token configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    /// Fallback token endpoint used when a credential has no token URL.
    /// `{client_id}` is replaced with the URL-encoded OAuth client id.
    #[serde(default)]
    pub url_template: Option<String>,
    /// Optional `scope` form field sent with every token request.
    #[serde(default)]
    pub scope: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            url_template: None,
            scope: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u32 {
    30
}

/// Storage backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub mode: StorageMode,
    #[serde(default)]
    pub local: LocalStorageConfig,
    /// Required when mode = "object_store"
    #[serde(default)]
    pub object_store: Option<ObjectStoreConfig>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            mode: StorageMode::default(),
            local: LocalStorageConfig::default(),
            object_store: None,
        }
    }
}

/// Available storage backends
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageMode {
    #[default]
    Local,
    #[serde(alias = "s3", alias = "object-store")]
    ObjectStore,
}

/// Local filesystem storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocalStorageConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./archive-output")
}

/// S3-compatible object store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObjectStoreConfig {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible services (MinIO, LocalStack)
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Static credentials. When absent the standard AWS environment is used.
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// Permit plain HTTP endpoints
    #[serde(default)]
    pub allow_http: bool,
}

/// Archive run configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArchiveConfig {
    /// strftime pattern for the date stamp in archive keys
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Days added to today's date to get the run date (e.g. -1 for yesterday)
    #[serde(default)]
    pub date_offset_days: i64,
    /// What to do when a single client fails
    #[serde(default)]
    pub on_client_error: ClientErrorPolicy,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            date_offset_days: 0,
            on_client_error: ClientErrorPolicy::default(),
        }
    }
}

fn default_date_format() -> String {
    "%Y%m%d".to_string()
}

/// Behavior when token issuance, trigger fetch or upload fails for a client
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClientErrorPolicy {
    /// Abort the whole run on the first failing client
    #[default]
    Abort,
    /// Record the failure and move on to the next client
    Continue,
}

/// Sanitized config for startup logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub database: DatabaseConfig,
    pub trigger: TriggerConfig,
    pub token: TokenConfig,
    pub storage: SanitizedStorageConfig,
    pub archive: ArchiveConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedStorageConfig {
    pub mode: String,
    pub local: LocalStorageConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_store: Option<SanitizedObjectStoreConfig>,
}

/// Sanitized object store config (static keys hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedObjectStoreConfig {
    pub bucket: String,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub static_credentials_configured: bool,
    pub allow_http: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            database: config.database.clone(),
            trigger: config.trigger.clone(),
            token: config.token.clone(),
            storage: SanitizedStorageConfig {
                mode: match config.storage.mode {
                    StorageMode::Local => "local".to_string(),
                    StorageMode::ObjectStore => "object_store".to_string(),
                },
                local: config.storage.local.clone(),
                object_store: config.storage.object_store.as_ref().map(|o| {
                    SanitizedObjectStoreConfig {
                        bucket: o.bucket.clone(),
                        region: o.region.clone(),
                        endpoint: o.endpoint.clone(),
                        static_credentials_configured: o
                            .secret_access_key
                            .as_deref()
                            .is_some_and(|s| !s.is_empty()),
                        allow_http: o.allow_http,
                    }
                }),
            },
            archive: config.archive.clone(),
        }
    }
}
