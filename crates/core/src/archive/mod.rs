//! Per-client archival of trigger responses.

mod orchestrator;
mod types;

pub use orchestrator::ArchiveOrchestrator;
pub use types::{
    offset_run_date, render_run_date, ArchiveError, ArchiveKey, ArchiveRunSummary, ArchivedClient,
    FailedClient,
};
