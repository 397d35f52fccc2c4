//! Error types for the working set and its collaborators.

use folio_model::{EntryId, ModelError};
use thiserror::Error;

/// Errors from canonical-order mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("entry {0} is not in the working set")]
    UnknownEntry(EntryId),
}

/// Errors translating a view-space gesture into a canonical splice.
///
/// None of these occur while the store and view invariants hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("dragged entry {0} is no longer in the working set")]
    UnknownSource(EntryId),
    #[error("drop target entry {0} is not in the working set")]
    UnknownTarget(EntryId),
    #[error("view slot {index} is outside a view of {len} entries")]
    SlotOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures reported by the merge/metadata engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// The engine could not be reached or started.
    #[error("engine unavailable: {0}")]
    Unavailable(String),

    /// The engine answered with something that could not be understood.
    #[error("engine protocol error: {0}")]
    Protocol(String),

    /// The engine understood the request and refused it.
    #[error("engine rejected request: {0}")]
    Rejected(String),

    /// I/O error while talking to the engine.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Errors surfaced by [`Session`](crate::Session) operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a merge is in progress")]
    Busy,
    #[error("at least two documents are required to merge, found {count}")]
    TooFewDocuments { count: usize },
    #[error("no drag gesture is in progress")]
    NoDrag,
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error(transparent)]
    Model(#[from] ModelError),
}
