//! Aggregation of per-id outcomes for bulk lock operations.
//!
//! Bulk calls never abort on a per-id failure: every input id is processed,
//! successes land positionally in `results` and failures in `errors`. The
//! store already reflects the successful ids (there is no cross-id
//! transactionality), so the partial successes are part of the contract, not
//! a detail to discard.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{LockError, MultiOpFailure};
use crate::types::{Lock, ObjectId};

/// Combined result of a multi-id lock operation.
///
/// `results` has one slot per input id, in input order; a slot is `None` iff
/// that id failed, in which case `errors` holds its specific error. Distinct
/// per-id errors are never collapsed into one message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub results: Vec<Option<Lock>>,
    pub errors: HashMap<ObjectId, LockError>,
}

impl BulkOutcome {
    pub fn with_capacity(len: usize) -> Self {
        Self {
            results: Vec::with_capacity(len),
            errors: HashMap::new(),
        }
    }

    pub fn record_ok(&mut self, lock: Lock) {
        self.results.push(Some(lock));
    }

    pub fn record_err(&mut self, id: ObjectId, error: LockError) {
        self.results.push(None);
        self.errors.insert(id, error);
    }

    /// True when every id succeeded.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn failed_len(&self) -> usize {
        self.errors.len()
    }

    /// Successful locks in input order, failed slots skipped.
    pub fn locks(&self) -> impl Iterator<Item = &Lock> {
        self.results.iter().flatten()
    }

    pub fn error_for(&self, id: &ObjectId) -> Option<&LockError> {
        self.errors.get(id)
    }

    /// Collapses into a plain `Result` for callers that only accept full
    /// success. On any failure this yields [`LockError::MultiOperation`]
    /// carrying the complete per-id error map and the partial successes.
    pub fn into_result(self) -> Result<Vec<Lock>, LockError> {
        if self.errors.is_empty() {
            return Ok(self.results.into_iter().flatten().collect());
        }
        Err(LockError::MultiOperation(Box::new(MultiOpFailure {
            results: self.results,
            errors: self.errors,
        })))
    }

    /// Unwraps a single-id bulk outcome into that id's result.
    pub(crate) fn into_single(mut self, id: &ObjectId) -> Result<Lock, LockError> {
        if let Some(err) = self.errors.remove(id) {
            return Err(err);
        }
        self.results
            .into_iter()
            .flatten()
            .next()
            .ok_or_else(|| LockError::NotLocked { id: id.clone() })
    }
}
