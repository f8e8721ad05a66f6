//! The create/verify/delete lifecycle manager.

use std::time::{Duration, Instant};

use chrono::Utc;
use futures_util::future::join_all;
use tracing::{debug, error, info, warn};

use fixtura_api::{ApiClient, Credentials, DeleteOutcome, ResourceKind, Session};

use crate::error::LifecycleError;
use crate::handle::{Handle, HandleState};
use crate::payload::{payloads, Payload};
use crate::report::{
    BatchResult, CreateReport, DeleteSummary, ExistCheck, ExistOutcome, GoneCheck, GoneOutcome,
    ItemError, RunReport,
};
use crate::run::RunId;

/// Log in and derive an authorized client.
///
/// A failed login is fatal for the whole run: it maps to
/// [`LifecycleError::Authentication`] and nothing else is attempted.
pub async fn connect(
    base_url: &str,
    credentials: &Credentials,
) -> Result<(ApiClient, Session), LifecycleError> {
    let client = ApiClient::builder(base_url).build()?;
    let token = client
        .login(&credentials.email, &credentials.password)
        .await
        .map_err(|err| LifecycleError::Authentication(err.to_string()))?;
    let session = Session {
        token,
        merchant_id: credentials.merchant_id.clone(),
    };
    let client = client.authorized(&session)?;
    info!("authenticated");
    Ok((client, session))
}

/// Tuning for batch processing.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Upper bound on in-flight requests. Chunks are sized to this, so
    /// it is a hard cap, not a hint.
    pub batch_size: usize,
    /// Delete attempts per record before giving up.
    pub max_delete_attempts: u32,
    /// Fixed pause between delete attempts for the same record.
    pub delete_backoff: Duration,
    /// Pause between creation chunks. Zero disables it.
    pub chunk_pause: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            max_delete_attempts: 3,
            delete_backoff: Duration::from_secs(1),
            chunk_pause: Duration::ZERO,
        }
    }
}

/// Drives one remote resource collection through create, verify,
/// delete, and verify-deleted phases.
pub struct LifecycleManager {
    client: ApiClient,
    kind: ResourceKind,
    config: LifecycleConfig,
}

impl LifecycleManager {
    /// New manager with default tuning. The client must already be
    /// authorized.
    #[must_use]
    pub fn new(client: ApiClient, kind: ResourceKind) -> Self {
        Self::with_config(client, kind, LifecycleConfig::default())
    }

    /// New manager with explicit tuning.
    #[must_use]
    pub const fn with_config(
        client: ApiClient,
        kind: ResourceKind,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            client,
            kind,
            config,
        }
    }

    /// The underlying client.
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// The resource collection this manager targets.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    fn chunk_size(&self) -> usize {
        self.config.batch_size.max(1)
    }

    /// Create every payload, in chunks of at most the configured batch
    /// size. Requests within a chunk run concurrently; chunks are
    /// strictly sequential. A failed item is recorded and the rest of
    /// the chunk proceeds.
    ///
    /// Summed across chunks, `attempted` always equals the number of
    /// payloads and `succeeded` equals the number of handles returned.
    pub async fn create_batch<I>(&self, items: I) -> CreateReport
    where
        I: IntoIterator<Item = Payload>,
    {
        let items: Vec<Payload> = items.into_iter().collect();
        let total = items.len();
        let mut report = CreateReport::default();
        if total == 0 {
            info!(resource = %self.kind, "nothing to create");
            return report;
        }

        let chunk_size = self.chunk_size();
        let chunk_count = total.div_ceil(chunk_size);
        for (chunk_index, chunk) in items.chunks(chunk_size).enumerate() {
            let outcomes = join_all(chunk.iter().map(|payload| async move {
                let created = self.client.create(self.kind, &payload.body).await;
                (payload, created)
            }))
            .await;

            let mut result = BatchResult {
                attempted: chunk.len(),
                ..BatchResult::default()
            };
            for (payload, created) in outcomes {
                match created {
                    Ok(id) => {
                        result.succeeded += 1;
                        report.handles.push(Handle::new(id, payload.clone()));
                    }
                    Err(err) => {
                        warn!(item = %payload.label, error = %err, "creation failed");
                        result.failed += 1;
                        result.errors.push(ItemError {
                            label: payload.label.clone(),
                            error: err.to_string(),
                        });
                    }
                }
            }
            info!(
                chunk = chunk_index + 1,
                chunks = chunk_count,
                created = report.handles.len(),
                total,
                "creation chunk complete"
            );
            report.batches.push(result);

            if !self.config.chunk_pause.is_zero() && chunk_index + 1 < chunk_count {
                tokio::time::sleep(self.config.chunk_pause).await;
            }
        }
        report
    }

    /// Fetch every handle by id and report whether it exists.
    ///
    /// Does not mutate remote state. A 200 with a matching id is
    /// `Found`, a 404 is `NotFound`, anything else is `Inconclusive`
    /// and surfaced distinctly.
    pub async fn verify_exist(&self, handles: &[Handle]) -> Vec<ExistCheck> {
        let mut checks = Vec::with_capacity(handles.len());
        for chunk in handles.chunks(self.chunk_size()) {
            let outcomes = join_all(chunk.iter().map(|handle| async move {
                (
                    handle.id.clone(),
                    self.client.get(self.kind, &handle.id).await,
                )
            }))
            .await;
            for (id, fetched) in outcomes {
                let outcome = match fetched {
                    Ok(Some(record)) if record.id == id => ExistOutcome::Found,
                    Ok(Some(record)) => ExistOutcome::Inconclusive(format!(
                        "response id `{}` does not match requested id",
                        record.id
                    )),
                    Ok(None) => ExistOutcome::NotFound,
                    Err(err) => ExistOutcome::Inconclusive(err.to_string()),
                };
                checks.push(ExistCheck { id, outcome });
            }
        }
        checks
    }

    /// Delete every handle, with bounded per-item retry.
    pub async fn delete_all(&self, handles: &[Handle]) -> DeleteSummary {
        let ids: Vec<String> = handles.iter().map(|handle| handle.id.clone()).collect();
        self.delete_ids(&ids).await
    }

    /// Delete records by id, in bounded chunks.
    ///
    /// Each record gets up to the configured number of attempts with a
    /// fixed backoff between them. A 404 counts as success ("already
    /// gone"). One record's exhaustion never blocks the others; its id
    /// lands in `failed_ids` for manual follow-up.
    pub async fn delete_ids(&self, ids: &[String]) -> DeleteSummary {
        let mut summary = DeleteSummary::default();
        let total = ids.len();
        for chunk in ids.chunks(self.chunk_size()) {
            let outcomes = join_all(
                chunk
                    .iter()
                    .map(|id| async move { (id.clone(), self.delete_one(id).await) }),
            )
            .await;
            for (id, state) in outcomes {
                if state == HandleState::Deleted {
                    summary.deleted += 1;
                } else {
                    summary.errors += 1;
                    summary.failed_ids.push(id);
                }
            }
            info!(
                deleted = summary.deleted,
                errors = summary.errors,
                total,
                "deletion progress"
            );
        }
        summary
    }

    /// Drive one record to a terminal deletion state.
    async fn delete_one(&self, id: &str) -> HandleState {
        let max_attempts = self.config.max_delete_attempts.max(1);
        let mut state = HandleState::Created;
        while !state.is_terminal() {
            let attempt = match state {
                HandleState::DeletionAttempted(n) => n + 1,
                _ => 1,
            };
            if attempt > max_attempts {
                state = HandleState::DeletionFailed;
                break;
            }
            match self.client.delete(self.kind, id).await {
                Ok(outcome) => {
                    if outcome == DeleteOutcome::AlreadyGone {
                        debug!(id, "record already gone");
                    }
                    state = HandleState::Deleted;
                }
                Err(err) => {
                    warn!(id, attempt, error = %err, "delete attempt failed");
                    state = HandleState::DeletionAttempted(attempt);
                    if attempt < max_attempts {
                        tokio::time::sleep(self.config.delete_backoff).await;
                    }
                }
            }
        }
        state
    }

    /// Confirm every handle is gone after deletion.
    ///
    /// Mirrors [`verify_exist`](Self::verify_exist) with inverted
    /// expectations: a 404 is the success outcome, a 200 means the
    /// earlier deletion did not take effect and is reported loudly.
    pub async fn verify_deleted(&self, handles: &[Handle]) -> Vec<GoneCheck> {
        let mut checks = Vec::with_capacity(handles.len());
        for chunk in handles.chunks(self.chunk_size()) {
            let outcomes = join_all(chunk.iter().map(|handle| async move {
                (
                    handle.id.clone(),
                    self.client.get(self.kind, &handle.id).await,
                )
            }))
            .await;
            for (id, fetched) in outcomes {
                let outcome = match fetched {
                    Ok(Some(_)) => {
                        error!(id, "record still exists after deletion");
                        GoneOutcome::StillExists
                    }
                    Ok(None) => GoneOutcome::Gone,
                    Err(err) => GoneOutcome::Inconclusive(err.to_string()),
                };
                checks.push(GoneCheck { id, outcome });
            }
        }
        checks
    }

    /// Run the full create → verify → delete → verify-deleted cycle
    /// and aggregate everything into one report.
    pub async fn run_cycle(&self, count: usize, run_id: RunId) -> RunReport {
        let started_at = Utc::now();
        let start = Instant::now();
        info!(run = %run_id, resource = %self.kind, count, "starting lifecycle cycle");

        let create = self.create_batch(payloads(self.kind, count, run_id)).await;
        let exists = self.verify_exist(&create.handles).await;
        let deletion = self.delete_all(&create.handles).await;
        let gone = self.verify_deleted(&create.handles).await;

        let still_existing: Vec<String> = gone
            .iter()
            .filter(|check| check.outcome == GoneOutcome::StillExists)
            .map(|check| check.id.clone())
            .collect();

        let report = RunReport {
            run_id: run_id.to_string(),
            resource: self.kind.to_string(),
            requested: count,
            created: create.succeeded(),
            create_failures: create.failed(),
            verified_found: exists
                .iter()
                .filter(|check| check.outcome == ExistOutcome::Found)
                .count(),
            verified_missing: exists
                .iter()
                .filter(|check| check.outcome == ExistOutcome::NotFound)
                .count(),
            verify_inconclusive: exists
                .iter()
                .filter(|check| matches!(check.outcome, ExistOutcome::Inconclusive(_)))
                .count(),
            deleted: deletion.deleted,
            delete_errors: deletion.errors,
            failed_ids: deletion.failed_ids,
            still_existing,
            gone_inconclusive: gone
                .iter()
                .filter(|check| matches!(check.outcome, GoneOutcome::Inconclusive(_)))
                .count(),
            started_at,
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        if report.is_clean() {
            info!(
                run = %run_id,
                created = report.created,
                deleted = report.deleted,
                duration_ms = report.duration_ms,
                "cycle complete"
            );
        } else {
            warn!(
                run = %run_id,
                created = report.created,
                create_failures = report.create_failures,
                deleted = report.deleted,
                delete_errors = report.delete_errors,
                still_existing = report.still_existing.len(),
                duration_ms = report.duration_ms,
                "cycle completed with failures"
            );
        }
        report
    }
}
