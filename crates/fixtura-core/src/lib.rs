//! fixtura-core - test-data lifecycle manager for a remote invoicing API.
//!
//! Drives a remote CRUD resource through a full create → verify →
//! delete → verify-deleted cycle for a configurable volume of synthetic
//! records, in bounded batches, tolerating transient failures, and
//! reporting precise counts so a caller can assert on completeness.
//!
//! The manager holds no persistent state: every record lives in the
//! remote API, and local handles are discarded at the end of a run.
//! Deletes are idempotent (a 404 counts as success), which keeps runs
//! safe to repeat after partial failure.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

mod cleanup;
mod error;
mod handle;
mod lifecycle;
pub mod nif;
mod payload;
mod report;
mod run;

pub use cleanup::{cleanup, discover, CleanupFilter, DiscoveryConfig};
pub use error::LifecycleError;
pub use handle::{Handle, HandleState};
pub use lifecycle::{connect, LifecycleConfig, LifecycleManager};
pub use payload::{build, payloads, Payload, RUN_MARKER};
pub use report::{
    BatchResult, CleanupReport, CreateReport, DeleteSummary, ExistCheck, ExistOutcome, GoneCheck,
    GoneOutcome, ItemError, RunReport,
};
pub use run::RunId;
