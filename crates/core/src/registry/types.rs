use serde::Serialize;

/// A client whose trigger response is archived on every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientRecord {
    pub client_id: i64,
    pub name: String,
    /// Reference into the credential store, if the client requires OAuth2.
    pub credential_id: Option<i64>,
}

impl ClientRecord {
    pub fn new(client_id: i64, name: impl Into<String>, credential_id: Option<i64>) -> Self {
        Self {
            client_id,
            name: name.into(),
            credential_id,
        }
    }
}

/// OAuth2 client-credentials triple plus the endpoint that accepts it.
///
/// The secret never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredential {
    pub credential_id: i64,
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
}

impl std::fmt::Debug for ClientCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredential")
            .field("credential_id", &self.credential_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("token_url", &self.token_url)
            .finish()
    }
}
