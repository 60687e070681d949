//! Testing utilities and mock implementations.
//!
//! Every collaborator of the orchestrator has a recording mock here, so runs
//! can be exercised end to end without a token server, a trigger endpoint or
//! real storage.
//!
//! # Example
//!
//! ```rust,ignore
//! use trigger_archiver_core::testing::{MockRegistry, MockStorageSink, MockTokenIssuer, MockTriggerClient};
//!
//! let issuer = Arc::new(MockTokenIssuer::new());
//! issuer.set_token(7, "tok123").await;
//!
//! let trigger = Arc::new(MockTriggerClient::new());
//! trigger.set_response(2, r#"{"data":1}"#).await;
//!
//! // Build an ArchiveOrchestrator with the mocks and inspect them afterwards
//! ```

mod mock_registry;
mod mock_storage;
mod mock_token_issuer;
mod mock_trigger_client;

pub use mock_registry::MockRegistry;
pub use mock_storage::MockStorageSink;
pub use mock_token_issuer::MockTokenIssuer;
pub use mock_trigger_client::{MockTriggerClient, RecordedFetch};

/// SQLite registry fixtures.
pub mod fixtures {
    use rusqlite::{params, Connection};

    /// Clients query matching [`create_registry_schema`].
    pub const CLIENTS_QUERY: &str =
        "SELECT ClientID, Name, OAuth2ClientCredentialsID FROM Clients ORDER BY ClientID";

    /// Create the client and credential tables used by the fixtures.
    pub fn create_registry_schema(conn: &Connection) {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS Clients (
                ClientID INTEGER PRIMARY KEY,
                Name TEXT,
                OAuth2ClientCredentialsID INTEGER
            );

            CREATE TABLE IF NOT EXISTS OAuth2ClientCredentials (
                ClientCredentialsID INTEGER PRIMARY KEY,
                ClientId TEXT NOT NULL,
                ClientSecret TEXT NOT NULL,
                TokenUrl TEXT
            );
            "#,
        )
        .expect("Failed to create registry schema");
    }

    /// In-memory database with the registry schema.
    pub fn registry_connection() -> Connection {
        let conn = Connection::open_in_memory().expect("Failed to open in-memory database");
        create_registry_schema(&conn);
        conn
    }

    pub fn insert_client(conn: &Connection, client_id: i64, name: &str, credential_id: Option<i64>) {
        conn.execute(
            "INSERT INTO Clients (ClientID, Name, OAuth2ClientCredentialsID) VALUES (?1, ?2, ?3)",
            params![client_id, name, credential_id],
        )
        .expect("Failed to insert client");
    }

    pub fn insert_credential(
        conn: &Connection,
        credential_id: i64,
        client_id: &str,
        client_secret: &str,
        token_url: &str,
    ) {
        conn.execute(
            "INSERT INTO OAuth2ClientCredentials (ClientCredentialsID, ClientId, ClientSecret, TokenUrl) \
             VALUES (?1, ?2, ?3, ?4)",
            params![credential_id, client_id, client_secret, token_url],
        )
        .expect("Failed to insert credential");
    }
}
