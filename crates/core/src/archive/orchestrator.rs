//! Archive run orchestration.
//!
//! One run reads the client list once, renders the run date once and then
//! walks the clients strictly in registry order:
//! token (if the client has a credential) -> trigger fetch -> key -> upload.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::config::{ArchiveConfig, ClientErrorPolicy};
use crate::registry::{ClientRecord, ClientRegistry};
use crate::storage::StorageSink;
use crate::token::TokenIssuer;
use crate::trigger::TriggerClient;

use super::types::{
    offset_run_date, render_run_date, ArchiveError, ArchiveKey, ArchiveRunSummary,
    ArchivedClient, FailedClient,
};

/// Drives one archive run over every registered client.
pub struct ArchiveOrchestrator {
    config: ArchiveConfig,
    registry: Arc<dyn ClientRegistry>,
    token_issuer: Arc<dyn TokenIssuer>,
    trigger_client: Arc<dyn TriggerClient>,
    storage: Arc<dyn StorageSink>,
}

impl ArchiveOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        config: ArchiveConfig,
        registry: Arc<dyn ClientRegistry>,
        token_issuer: Arc<dyn TokenIssuer>,
        trigger_client: Arc<dyn TriggerClient>,
        storage: Arc<dyn StorageSink>,
    ) -> Self {
        Self {
            config,
            registry,
            token_issuer,
            trigger_client,
            storage,
        }
    }

    /// Archive every client, dated today in the local time zone shifted by
    /// `archive.date_offset_days`.
    pub async fn run_archive(&self) -> Result<ArchiveRunSummary, ArchiveError> {
        let date = offset_run_date(Local::now().date_naive(), self.config.date_offset_days)?;
        self.run_archive_on(date).await
    }

    /// Archive every client with an explicit run date.
    ///
    /// Under [`ClientErrorPolicy::Abort`] the first failing client ends the run
    /// with its error; earlier uploads stay in place.
    pub async fn run_archive_on(&self, date: NaiveDate) -> Result<ArchiveRunSummary, ArchiveError> {
        let clients = self.registry.list_clients()?;
        let run_date = render_run_date(date, &self.config.date_format)?;
        let summary = ArchiveRunSummary::new(run_date.clone());

        let span = info_span!("run", run_id = %summary.run_id, run_date = %run_date);
        self.archive_all(&clients, &run_date, summary)
            .instrument(span)
            .await
    }

    async fn archive_all(
        &self,
        clients: &[ClientRecord],
        run_date: &str,
        mut summary: ArchiveRunSummary,
    ) -> Result<ArchiveRunSummary, ArchiveError> {
        info!(
            clients = clients.len(),
            storage = self.storage.name(),
            "Starting archive run"
        );

        for client in clients {
            match self.archive_client(client, run_date).await {
                Ok(archived) => {
                    info!(
                        client_id = archived.client_id,
                        key = %archived.key,
                        bytes = archived.bytes,
                        authenticated = archived.authenticated,
                        "Archived client"
                    );
                    summary.archived.push(archived);
                }
                Err(e) => match self.config.on_client_error {
                    ClientErrorPolicy::Abort => {
                        error!(
                            client_id = client.client_id,
                            archived = summary.archived.len(),
                            "Aborting archive run: {}",
                            e
                        );
                        return Err(e);
                    }
                    ClientErrorPolicy::Continue => {
                        warn!(client_id = client.client_id, "Skipping client: {}", e);
                        summary.failed.push(FailedClient {
                            client_id: client.client_id,
                            error: e.to_string(),
                        });
                    }
                },
            }
        }

        info!(
            archived = summary.archived.len(),
            failed = summary.failed.len(),
            "Archive run finished"
        );

        Ok(summary)
    }

    async fn archive_client(
        &self,
        client: &ClientRecord,
        run_date: &str,
    ) -> Result<ArchivedClient, ArchiveError> {
        let client_id = client.client_id;
        debug!(client_id, name = %client.name, "Processing client");

        let token = match client.credential_id {
            Some(_) => self
                .token_issuer
                .get_token_for_credential(client.credential_id)
                .await
                .map_err(|source| ArchiveError::Token { client_id, source })?,
            None => None,
        };
        let authenticated = token.as_ref().is_some_and(|t| !t.is_empty());

        let body = self
            .trigger_client
            .fetch(client_id, token.as_ref())
            .await
            .map_err(|source| ArchiveError::Trigger { client_id, source })?;

        let key = ArchiveKey::for_client(client_id, run_date);

        self.storage
            .upload(key.as_str(), &body)
            .await
            .map_err(|source| ArchiveError::Storage { client_id, source })?;

        Ok(ArchivedClient {
            client_id,
            location: self.storage.location(key.as_str()),
            key,
            bytes: body.len(),
            sha256: format!("{:x}", Sha256::digest(body.as_bytes())),
            authenticated,
        })
    }
}
