use chrono::{NaiveDate, TimeDelta};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::registry::RegistryError;
use crate::storage::StorageError;
use crate::token::TokenError;
use crate::trigger::TriggerError;

/// Deterministic storage key of one client's archive for one run date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ArchiveKey(String);

impl ArchiveKey {
    /// `trigger/{id}/file/{id}_trigger_{date}.json`
    pub fn for_client(client_id: i64, run_date: &str) -> Self {
        Self(format!(
            "trigger/{client_id}/file/{client_id}_trigger_{run_date}.json"
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArchiveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render a run date with a strftime pattern.
///
/// Fails instead of panicking when the pattern needs fields a date lacks.
pub fn render_run_date(date: NaiveDate, pattern: &str) -> Result<String, ArchiveError> {
    let mut rendered = String::new();
    fmt::write(&mut rendered, format_args!("{}", date.format(pattern)))
        .map_err(|_| ArchiveError::InvalidDateFormat(pattern.to_string()))?;
    Ok(rendered)
}

/// Shift `today` by `offset_days`, failing when the result leaves chrono's range.
pub fn offset_run_date(today: NaiveDate, offset_days: i64) -> Result<NaiveDate, ArchiveError> {
    TimeDelta::try_days(offset_days)
        .and_then(|delta| today.checked_add_signed(delta))
        .ok_or(ArchiveError::InvalidDateOffset(offset_days))
}

/// One client written during a run.
#[derive(Debug, Clone, Serialize)]
pub struct ArchivedClient {
    pub client_id: i64,
    pub key: ArchiveKey,
    /// Where the sink put it (file path or object URL)
    pub location: String,
    pub bytes: usize,
    /// Hex SHA-256 of the archived content
    pub sha256: String,
    /// Whether the trigger call carried a bearer token
    pub authenticated: bool,
}

/// One client skipped under the continue-on-error policy.
#[derive(Debug, Clone, Serialize)]
pub struct FailedClient {
    pub client_id: i64,
    pub error: String,
}

/// Outcome of an archive run.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveRunSummary {
    pub run_id: Uuid,
    pub run_date: String,
    pub archived: Vec<ArchivedClient>,
    pub failed: Vec<FailedClient>,
}

impl ArchiveRunSummary {
    pub fn new(run_date: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            run_date: run_date.into(),
            archived: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Fatal errors of an archive run.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to list clients: {0}")]
    Registry(#[from] RegistryError),

    #[error("Token issuance failed for client {client_id}: {source}")]
    Token {
        client_id: i64,
        #[source]
        source: TokenError,
    },

    #[error("Trigger fetch failed for client {client_id}: {source}")]
    Trigger {
        client_id: i64,
        #[source]
        source: TriggerError,
    },

    #[error("Upload failed for client {client_id}: {source}")]
    Storage {
        client_id: i64,
        #[source]
        source: StorageError,
    },

    #[error("Invalid date format: {0}")]
    InvalidDateFormat(String),

    #[error("Run date offset of {0} days is out of range")]
    InvalidDateOffset(i64),
}

impl ArchiveError {
    /// The client being processed when the error occurred, if any.
    pub fn client_id(&self) -> Option<i64> {
        match self {
            Self::Token { client_id, .. }
            | Self::Trigger { client_id, .. }
            | Self::Storage { client_id, .. } => Some(*client_id),
            Self::Registry(_) | Self::InvalidDateFormat(_) | Self::InvalidDateOffset(_) => None,
        }
    }
}
