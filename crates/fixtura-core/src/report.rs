//! Aggregate result structures for lifecycle runs.
//!
//! Per-item failures are collected into these structures instead of
//! being raised: a batch always runs to completion and the caller
//! asserts on the totals.

use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::handle::Handle;

/// Per-item failure record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemError {
    /// Identifying label of the item (payload name or record id).
    pub label: String,
    /// Error description.
    pub error: String,
}

/// Result of one creation chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Items submitted in the chunk.
    pub attempted: usize,
    /// Items created successfully.
    pub succeeded: usize,
    /// Items that failed.
    pub failed: usize,
    /// One entry per failed item.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ItemError>,
}

/// Creation phase output: per-chunk results plus the handles that feed
/// the verify and delete phases.
#[derive(Debug, Clone, Default)]
pub struct CreateReport {
    /// One result per chunk, in submission order.
    pub batches: Vec<BatchResult>,
    /// Handles for every successfully created record.
    pub handles: Vec<Handle>,
}

impl CreateReport {
    /// Total items submitted across all chunks.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.batches.iter().map(|batch| batch.attempted).sum()
    }

    /// Total items created across all chunks. Always equals the number
    /// of handles.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.batches.iter().map(|batch| batch.succeeded).sum()
    }

    /// Total items that failed across all chunks.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.batches.iter().map(|batch| batch.failed).sum()
    }
}

/// Outcome of the delete phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteSummary {
    /// Records confirmed deleted (including "already gone").
    pub deleted: usize,
    /// Records whose deletion failed after exhausting retries.
    pub errors: usize,
    /// Ids that could not be deleted, for manual follow-up.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_ids: Vec<String>,
}

/// Outcome of a single existence check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExistOutcome {
    /// 200 with a matching id.
    Found,
    /// Definitive 404.
    NotFound,
    /// Any other status or a transport failure; neither confirmed nor
    /// denied.
    Inconclusive(String),
}

/// Existence check result for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistCheck {
    /// Record id.
    pub id: String,
    /// What the check established.
    pub outcome: ExistOutcome,
}

/// Outcome of a single post-delete check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoneOutcome {
    /// Definitive 404, the expected outcome.
    Gone,
    /// The record still answers 200: deletion did not take effect.
    StillExists,
    /// Any other status or a transport failure.
    Inconclusive(String),
}

/// Post-delete check result for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoneCheck {
    /// Record id.
    pub id: String,
    /// What the check established.
    pub outcome: GoneOutcome,
}

/// Final report for a full create/verify/delete/verify-deleted cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Run identifier.
    pub run_id: String,
    /// Resource collection the run targeted.
    pub resource: String,
    /// Records requested.
    pub requested: usize,
    /// Records created.
    pub created: usize,
    /// Creation failures.
    pub create_failures: usize,
    /// Records confirmed present after creation.
    pub verified_found: usize,
    /// Records missing right after creation (unexpected).
    pub verified_missing: usize,
    /// Existence checks that were inconclusive.
    pub verify_inconclusive: usize,
    /// Records confirmed deleted.
    pub deleted: usize,
    /// Deletion failures after retry exhaustion.
    pub delete_errors: usize,
    /// Ids whose deletion failed, for manual follow-up.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_ids: Vec<String>,
    /// Ids still answering 200 after deletion: integrity violations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub still_existing: Vec<String>,
    /// Post-delete checks that were inconclusive.
    pub gone_inconclusive: usize,
    /// Wall-clock start of the run (UTC).
    pub started_at: DateTime<Utc>,
    /// Total run duration in milliseconds.
    pub duration_ms: u64,
}

impl RunReport {
    /// Whether every record went through the full cycle cleanly.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.created == self.requested
            && self.create_failures == 0
            && self.verified_found == self.created
            && self.verify_inconclusive == 0
            && self.deleted == self.created
            && self.delete_errors == 0
            && self.still_existing.is_empty()
            && self.gone_inconclusive == 0
    }

    /// Serialize the report as a single JSON line.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Write the report as one JSON line to a file.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let line = serde_json::to_string(self)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;
        let mut file = std::fs::File::create(path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

/// Report for a discovery-driven cleanup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupReport {
    /// Records discovered across all pages.
    pub discovered: usize,
    /// Records matching the cleanup filter.
    pub matched: usize,
    /// Records confirmed deleted.
    pub deleted: usize,
    /// Deletion failures after retry exhaustion.
    pub errors: usize,
    /// Ids whose deletion failed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_ids: Vec<String>,
    /// Total cleanup duration in milliseconds.
    pub duration_ms: u64,
}
