use thiserror::Error;

use super::{ClientCredential, ClientRecord};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to open client registry: {0}")]
    Open(String),

    #[error("Registry query failed: {0}")]
    Query(String),

    #[error("Client list contains duplicate client id {0}")]
    DuplicateClientId(i64),
}

/// Source of the clients to archive.
pub trait ClientRegistry: Send + Sync {
    /// List every client to archive, in archive order.
    fn list_clients(&self) -> Result<Vec<ClientRecord>, RegistryError>;
}

/// Lookup of OAuth2 client credentials by reference.
pub trait CredentialStore: Send + Sync {
    /// Returns `Ok(None)` when no credential has this id.
    fn find_by_id(&self, credential_id: i64) -> Result<Option<ClientCredential>, RegistryError>;
}
