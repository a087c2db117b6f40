use crate::types::{Lock, ObjectId};

// Backends only need single-key atomicity; the service layers per-id
// check-then-act serialization on top of this contract.

/// Keyed storage of lock rows, one row per protected object id.
pub trait LockStore {
    /// Current row for an id, active or not. Activity is the caller's call.
    fn get(&self, id: &ObjectId) -> Option<Lock>;

    /// Insert or replace the row for `lock.object_id`.
    fn put(&mut self, lock: Lock);

    /// Remove the row for an id; false if no row existed.
    fn remove(&mut self, id: &ObjectId) -> bool;

    /// All rows matching a predicate.
    fn scan(&self, predicate: &dyn Fn(&Lock) -> bool) -> Vec<Lock>;

    /// Number of stored rows, expired ones included.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
