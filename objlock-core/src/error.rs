use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Lock, ObjectId};

/// The closed set of failures the lock core can report.
///
/// Every variant is recoverable by the caller: retry with backoff, request an
/// override, or surface the holder's identity to the end user. Nothing here
/// is process-fatal.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum LockError {
    /// Create was refused because another owner holds an active lock.
    #[error("object {id} is already locked by '{locker}' ({remaining_ms} ms left on lease)")]
    AlreadyLocked {
        id: ObjectId,
        locker: String,
        remaining_ms: u64,
    },

    /// Extend or version lookup found no active lock for the object.
    #[error("object {id} is not locked")]
    NotLocked { id: ObjectId },

    /// Extend was refused because the active lock belongs to a different owner.
    #[error("object {id} is locked by '{locker}' from another session ({remaining_ms} ms left on lease)")]
    LockedBySomebodyElse {
        id: ObjectId,
        locker: String,
        remaining_ms: u64,
    },

    /// The supplied session identifier is structurally invalid.
    #[error("invalid session for object {id}")]
    InvalidSession { id: ObjectId },

    /// Extend interval below the minimum; rejected before any per-id work.
    #[error("extend interval {interval_ms} ms is below the minimum extend interval")]
    InvalidInterval { interval_ms: u64 },

    /// One or more ids of a bulk call failed. Carries the full per-id error
    /// map and the partial successes; the store already reflects the ids that
    /// succeeded, so callers must not discard them.
    #[error("{failed} of {total} bulk lock operations failed", failed = .0.errors.len(), total = .0.results.len())]
    MultiOperation(Box<MultiOpFailure>),
}

/// Payload of [`LockError::MultiOperation`]: the positional results sequence
/// (one slot per input id, `None` where that id failed) plus the map from
/// failed id to its specific error. Distinct errors are never collapsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiOpFailure {
    pub results: Vec<Option<Lock>>,
    pub errors: HashMap<ObjectId, LockError>,
}

impl LockError {
    /// The object id this error is about, if it is a per-id error.
    pub fn object_id(&self) -> Option<&ObjectId> {
        match self {
            LockError::AlreadyLocked { id, .. }
            | LockError::NotLocked { id }
            | LockError::LockedBySomebodyElse { id, .. }
            | LockError::InvalidSession { id } => Some(id),
            LockError::InvalidInterval { .. } | LockError::MultiOperation(_) => None,
        }
    }
}
