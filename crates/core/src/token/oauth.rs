//! OAuth2 client-credentials token issuer.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::TokenConfig;
use crate::registry::{ClientCredential, CredentialStore};

use super::types::TokenResponse;
use super::{AccessToken, TokenError, TokenIssuer};

/// Token issuer backed by the credential store and the OAuth2 token endpoint.
///
/// A fresh HTTP client is built for every request; nothing is cached between
/// calls, even for clients sharing a credential.
pub struct OAuthTokenIssuer {
    credentials: Arc<dyn CredentialStore>,
    config: TokenConfig,
}

impl OAuthTokenIssuer {
    pub fn new(credentials: Arc<dyn CredentialStore>, config: TokenConfig) -> Self {
        Self {
            credentials,
            config,
        }
    }

    /// The credential's own token URL, falling back to the configured template.
    fn resolve_token_url(&self, credential: &ClientCredential) -> Option<String> {
        let own = credential.token_url.trim();
        if !own.is_empty() {
            return Some(own.to_string());
        }

        self.config
            .url_template
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| t.replace("{client_id}", &urlencoding::encode(&credential.client_id)))
    }

    fn http_client(&self) -> Result<Client, TokenError> {
        Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs as u64))
            .build()
            .map_err(|e| TokenError::Request(format!("Failed to create HTTP client: {}", e)))
    }

    async fn request_token(
        &self,
        credential: &ClientCredential,
        token_url: &str,
    ) -> Result<Option<AccessToken>, TokenError> {
        let mut form = vec![
            ("grant_type", "client_credentials"),
            ("client_id", credential.client_id.as_str()),
            ("client_secret", credential.client_secret.as_str()),
        ];
        if let Some(scope) = self.config.scope.as_deref() {
            form.push(("scope", scope));
        }

        let response = self
            .http_client()?
            .post(token_url)
            .form(&form)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                credential_id = credential.credential_id,
                status = status.as_u16(),
                "Token endpoint rejected request, continuing without token"
            );
            return Ok(None);
        }

        let body = response.bytes().await.map_err(map_transport_error)?;
        let token = match serde_json::from_slice::<TokenResponse>(&body) {
            Ok(parsed) => parsed.access_token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(
                    credential_id = credential.credential_id,
                    error = %e,
                    "Token response is not valid JSON, continuing without token"
                );
                return Ok(None);
            }
        };

        match token {
            Some(token) => {
                debug!(credential_id = credential.credential_id, "Token issued");
                Ok(Some(AccessToken::new(token)))
            }
            None => {
                warn!(
                    credential_id = credential.credential_id,
                    "Token response has no access_token, continuing without token"
                );
                Ok(None)
            }
        }
    }
}

fn map_transport_error(e: reqwest::Error) -> TokenError {
    if e.is_timeout() {
        TokenError::Timeout
    } else if e.is_connect() {
        TokenError::ConnectionFailed(e.to_string())
    } else {
        TokenError::Request(e.to_string())
    }
}

#[async_trait]
impl TokenIssuer for OAuthTokenIssuer {
    fn name(&self) -> &str {
        "oauth2_client_credentials"
    }

    async fn get_token_for_credential(
        &self,
        credential_id: Option<i64>,
    ) -> Result<Option<AccessToken>, TokenError> {
        let Some(credential_id) = credential_id else {
            return Ok(None);
        };

        let credential = self
            .credentials
            .find_by_id(credential_id)
            .map_err(|e| TokenError::CredentialLookup(e.to_string()))?;

        let Some(credential) = credential else {
            warn!(credential_id, "Credential not found, continuing without token");
            return Ok(None);
        };

        let Some(token_url) = self.resolve_token_url(&credential) else {
            warn!(credential_id, "Credential has no token URL, continuing without token");
            return Ok(None);
        };

        debug!(credential_id, token_url = %token_url, "Requesting client-credentials token");
        self.request_token(&credential, &token_url).await
    }
}
