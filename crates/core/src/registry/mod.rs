//! Client registry and credential store.
//!
//! The archiver reads the client list once per run and looks up OAuth2
//! credentials by reference. Both reads go through narrow traits so the
//! orchestrator never sees the backing database.

mod sqlite;
mod store;
mod types;

pub use sqlite::SqliteRegistry;
pub use store::{ClientRegistry, CredentialStore, RegistryError};
pub use types::{ClientCredential, ClientRecord};
