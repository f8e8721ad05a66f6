//! Local references to remote records.

use crate::payload::Payload;

/// Local reference pairing a generated payload with its server-assigned
/// id. Created on a successful POST, used as the key for all subsequent
/// verify/delete calls, and discarded at the end of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct Handle {
    /// Server-assigned identifier.
    pub id: String,
    /// The payload that produced the record.
    pub payload: Payload,
}

impl Handle {
    /// Pair a server id with its originating payload.
    #[must_use]
    pub const fn new(id: String, payload: Payload) -> Self {
        Self { id, payload }
    }
}

/// Per-record lifecycle state.
///
/// `Deleted` and `DeletionFailed` are terminal; `DeletionAttempted`
/// self-loops on transient failure up to the configured retry bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// Created on the server, not yet verified.
    Created,
    /// A fetch-by-id confirmed the record exists.
    VerifiedExists,
    /// A delete attempt failed; the count is attempts so far.
    DeletionAttempted(u32),
    /// Deletion confirmed (2xx, or 404 meaning already gone).
    Deleted,
    /// Retries exhausted without a successful delete.
    DeletionFailed,
}

impl HandleState {
    /// Whether the state is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Deleted | Self::DeletionFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(HandleState::Deleted.is_terminal());
        assert!(HandleState::DeletionFailed.is_terminal());
        assert!(!HandleState::Created.is_terminal());
        assert!(!HandleState::DeletionAttempted(2).is_terminal());
    }
}
