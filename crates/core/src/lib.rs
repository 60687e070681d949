pub mod archive;
pub mod config;
pub mod registry;
pub mod storage;
pub mod testing;
pub mod token;
pub mod trigger;

pub use archive::{
    ArchiveError, ArchiveKey, ArchiveOrchestrator, ArchiveRunSummary, ArchivedClient,
    FailedClient,
};
pub use config::{
    load_config, load_config_from_str, validate_config, ArchiveConfig, ClientErrorPolicy, Config,
    ConfigError, DatabaseConfig, LocalStorageConfig, ObjectStoreConfig, SanitizedConfig,
    StorageConfig, StorageMode, TokenConfig, TriggerConfig,
};
pub use registry::{
    ClientCredential, ClientRecord, ClientRegistry, CredentialStore, RegistryError,
    SqliteRegistry,
};
pub use storage::{
    create_storage_sink, LocalStorageSink, ObjectStoreSink, StorageError, StorageSink,
};
pub use token::{AccessToken, OAuthTokenIssuer, TokenError, TokenIssuer};
pub use trigger::{HttpTriggerClient, TriggerClient, TriggerError};
