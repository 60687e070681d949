use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use super::{ClientCredential, ClientRecord, ClientRegistry, CredentialStore, RegistryError};

const CREDENTIAL_QUERY: &str = "SELECT ClientId, ClientSecret, TokenUrl \
     FROM OAuth2ClientCredentials WHERE ClientCredentialsID = ?1";

/// SQLite-backed client registry and credential store.
///
/// The clients query is supplied by configuration and must return the client id
/// and name as its first two columns. An optional third column holds the
/// credential reference.
pub struct SqliteRegistry {
    conn: Mutex<Connection>,
    clients_query: String,
}

impl SqliteRegistry {
    /// Open an existing registry database read-only and check the clients query.
    pub fn open(path: &Path, clients_query: impl Into<String>) -> Result<Self, RegistryError> {
        if !path.exists() {
            return Err(RegistryError::Open(format!(
                "database file {} does not exist; check database.path",
                path.display()
            )));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            RegistryError::Open(format!(
                "cannot open {} ({}); check that the file is a readable SQLite database",
                path.display(),
                e
            ))
        })?;

        Self::from_connection(conn, clients_query)
    }

    /// Wrap an already open connection (useful for testing with in-memory databases).
    pub fn from_connection(
        conn: Connection,
        clients_query: impl Into<String>,
    ) -> Result<Self, RegistryError> {
        let clients_query = clients_query.into();

        {
            let stmt = conn.prepare(&clients_query).map_err(|e| {
                RegistryError::Open(format!(
                    "database.clients_query is not valid against this database: {e}"
                ))
            })?;
            if stmt.column_count() < 2 {
                return Err(RegistryError::Open(
                    "database.clients_query must return at least client id and name columns"
                        .to_string(),
                ));
            }
        }

        Ok(Self {
            conn: Mutex::new(conn),
            clients_query,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, RegistryError> {
        self.conn
            .lock()
            .map_err(|_| RegistryError::Query("registry connection lock poisoned".to_string()))
    }
}

impl ClientRegistry for SqliteRegistry {
    fn list_clients(&self) -> Result<Vec<ClientRecord>, RegistryError> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare(&self.clients_query)
            .map_err(|e| RegistryError::Query(e.to_string()))?;

        // A two-column query means no client uses OAuth2.
        let has_credential_column = stmt.column_count() >= 3;

        let rows = stmt
            .query_map([], |row| {
                let client_id: i64 = row.get(0)?;
                let name: Option<String> = row.get(1)?;
                let credential_id: Option<i64> = if has_credential_column {
                    row.get(2)?
                } else {
                    None
                };
                Ok(ClientRecord {
                    client_id,
                    name: name.unwrap_or_default(),
                    credential_id,
                })
            })
            .map_err(|e| RegistryError::Query(e.to_string()))?;

        let mut clients = Vec::new();
        let mut seen = HashSet::new();
        for row in rows {
            let client = row.map_err(|e| RegistryError::Query(e.to_string()))?;
            if !seen.insert(client.client_id) {
                return Err(RegistryError::DuplicateClientId(client.client_id));
            }
            clients.push(client);
        }

        Ok(clients)
    }
}

impl CredentialStore for SqliteRegistry {
    fn find_by_id(&self, credential_id: i64) -> Result<Option<ClientCredential>, RegistryError> {
        let conn = self.lock()?;

        conn.query_row(CREDENTIAL_QUERY, params![credential_id], |row| {
            let client_id: Option<String> = row.get(0)?;
            let client_secret: Option<String> = row.get(1)?;
            let token_url: Option<String> = row.get(2)?;
            Ok(ClientCredential {
                credential_id,
                client_id: client_id.unwrap_or_default(),
                client_secret: client_secret.unwrap_or_default(),
                token_url: token_url.unwrap_or_default(),
            })
        })
        .optional()
        .map_err(|e| RegistryError::Query(e.to_string()))
    }
}
