//! Mock trigger client for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::token::AccessToken;
use crate::trigger::{TriggerClient, TriggerError};

/// A recorded trigger call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFetch {
    pub client_id: i64,
    /// The bearer token sent, if any.
    pub bearer_token: Option<String>,
}

/// Mock implementation of the TriggerClient trait.
///
/// Clients without a configured response get `{"clientId":<id>}`.
#[derive(Debug, Default)]
pub struct MockTriggerClient {
    responses: Arc<RwLock<HashMap<i64, String>>>,
    failures: Arc<RwLock<HashMap<i64, u16>>>,
    fetches: Arc<RwLock<Vec<RecordedFetch>>>,
}

impl MockTriggerClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_response(&self, client_id: i64, body: &str) {
        self.responses
            .write()
            .await
            .insert(client_id, body.to_string());
    }

    /// Answer every fetch for `client_id` with a non-2xx status.
    pub async fn set_failure(&self, client_id: i64, status: u16) {
        self.failures.write().await.insert(client_id, status);
    }

    pub async fn recorded_fetches(&self) -> Vec<RecordedFetch> {
        self.fetches.read().await.clone()
    }
}

#[async_trait]
impl TriggerClient for MockTriggerClient {
    async fn fetch(
        &self,
        client_id: i64,
        bearer_token: Option<&AccessToken>,
    ) -> Result<String, TriggerError> {
        self.fetches.write().await.push(RecordedFetch {
            client_id,
            bearer_token: bearer_token
                .filter(|t| !t.is_empty())
                .map(|t| t.as_str().to_string()),
        });

        if let Some(status) = self.failures.read().await.get(&client_id) {
            return Err(TriggerError::FetchFailed { status: *status });
        }

        Ok(self
            .responses
            .read()
            .await
            .get(&client_id)
            .cloned()
            .unwrap_or_else(|| format!(r#"{{"clientId":{client_id}}}"#)))
    }
}
