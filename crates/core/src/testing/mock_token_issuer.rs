//! Mock token issuer for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::token::{AccessToken, TokenError, TokenIssuer};

/// Mock implementation of the TokenIssuer trait.
///
/// Credentials without a configured token resolve to "no token", like an
/// unknown credential reference.
#[derive(Debug, Default)]
pub struct MockTokenIssuer {
    tokens: Arc<RwLock<HashMap<i64, String>>>,
    /// One-shot errors, consumed by the next request for that credential.
    errors: Arc<RwLock<HashMap<i64, TokenError>>>,
    requests: Arc<RwLock<Vec<Option<i64>>>>,
}

impl MockTokenIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue `token` whenever `credential_id` is requested.
    pub async fn set_token(&self, credential_id: i64, token: &str) {
        self.tokens
            .write()
            .await
            .insert(credential_id, token.to_string());
    }

    /// Fail the next request for `credential_id`.
    pub async fn set_error(&self, credential_id: i64, error: TokenError) {
        self.errors.write().await.insert(credential_id, error);
    }

    /// Every credential reference requested, in order.
    pub async fn recorded_requests(&self) -> Vec<Option<i64>> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl TokenIssuer for MockTokenIssuer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn get_token_for_credential(
        &self,
        credential_id: Option<i64>,
    ) -> Result<Option<AccessToken>, TokenError> {
        self.requests.write().await.push(credential_id);

        let Some(credential_id) = credential_id else {
            return Ok(None);
        };

        if let Some(error) = self.errors.write().await.remove(&credential_id) {
            return Err(error);
        }

        Ok(self
            .tokens
            .read()
            .await
            .get(&credential_id)
            .map(|t| AccessToken::new(t.clone())))
    }
}
