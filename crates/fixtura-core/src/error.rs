//! Lifecycle error taxonomy.
//!
//! Only two failure classes abort a run: authentication (no session
//! means no operation can proceed) and discovery (the collection could
//! not be enumerated). Everything per-item — creation failures,
//! inconclusive checks, delete exhaustion, integrity violations — is
//! collected into result structures so sibling items always proceed.

use fixtura_api::{ApiError, PaginationError};
use thiserror::Error;

/// Fatal lifecycle errors.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Login failed; no operations can proceed.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Client construction or another non-item API failure.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Collection discovery failed or exceeded the page cap.
    #[error("discovery failed: {0}")]
    Discovery(#[from] PaginationError),
}
