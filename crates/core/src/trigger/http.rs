use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::TriggerConfig;
use crate::token::AccessToken;

use super::{TriggerClient, TriggerError};

const TRIGGER_PATH: &str = "/data-exchange/trigger";

/// HTTP implementation of the trigger endpoint contract.
pub struct HttpTriggerClient {
    config: TriggerConfig,
}

impl HttpTriggerClient {
    pub fn new(config: TriggerConfig) -> Self {
        Self { config }
    }

    /// Endpoint URL without the query string.
    fn endpoint_url(&self) -> String {
        format!(
            "{}{}",
            self.config.base_url.trim().trim_end_matches('/'),
            TRIGGER_PATH
        )
    }

    fn http_client(&self) -> Result<Client, TriggerError> {
        Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs as u64))
            .build()
            .map_err(|e| TriggerError::Request(format!("Failed to create HTTP client: {}", e)))
    }
}

fn map_transport_error(e: reqwest::Error) -> TriggerError {
    if e.is_timeout() {
        TriggerError::Timeout
    } else if e.is_connect() {
        TriggerError::ConnectionFailed(e.to_string())
    } else {
        TriggerError::Request(e.to_string())
    }
}

#[async_trait]
impl TriggerClient for HttpTriggerClient {
    async fn fetch(
        &self,
        client_id: i64,
        bearer_token: Option<&AccessToken>,
    ) -> Result<String, TriggerError> {
        let mut request = self
            .http_client()?
            .get(self.endpoint_url())
            .query(&[("clientId", client_id)]);

        let authenticated = match bearer_token.filter(|t| !t.is_empty()) {
            Some(token) => {
                request = request.bearer_auth(token.as_str());
                true
            }
            None => false,
        };

        debug!(client_id, authenticated, "Fetching trigger");

        let response = request.send().await.map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TriggerError::FetchFailed {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(map_transport_error)?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}
