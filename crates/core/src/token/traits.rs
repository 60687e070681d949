use async_trait::async_trait;
use thiserror::Error;

use super::AccessToken;

/// Fatal token-issuance failures.
///
/// Rejections from the token endpoint are not errors: they degrade to "no token".
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token request timed out")]
    Timeout,

    #[error("Token endpoint connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Token request failed: {0}")]
    Request(String),

    #[error("Credential lookup failed: {0}")]
    CredentialLookup(String),
}

/// Exchanges a stored credential reference for a bearer token.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Returns the name of this issuer implementation.
    fn name(&self) -> &str;

    /// Obtain a token for the credential, or `Ok(None)` when the client should
    /// be called unauthenticated.
    async fn get_token_for_credential(
        &self,
        credential_id: Option<i64>,
    ) -> Result<Option<AccessToken>, TokenError>;
}
