//! Per-client trigger endpoint.

mod http;

pub use http::HttpTriggerClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::token::AccessToken;

/// Errors from the trigger endpoint. All of them abort the client.
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("Trigger fetch failed with HTTP {status}")]
    FetchFailed { status: u16 },

    #[error("Trigger request timed out")]
    Timeout,

    #[error("Trigger endpoint connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Trigger request failed: {0}")]
    Request(String),
}

impl TriggerError {
    /// HTTP status of a rejected fetch, if the endpoint answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::FetchFailed { status } => Some(*status),
            _ => None,
        }
    }
}

/// Fetches the payload to archive for one client.
#[async_trait]
pub trait TriggerClient: Send + Sync {
    /// Returns the raw response body. The token is sent as a bearer
    /// credential only when present and non-empty.
    async fn fetch(
        &self,
        client_id: i64,
        bearer_token: Option<&AccessToken>,
    ) -> Result<String, TriggerError>;
}
