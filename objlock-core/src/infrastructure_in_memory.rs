use std::collections::HashMap;

use crate::infrastructure::LockStore;
use crate::types::{Lock, ObjectId};

/// Process-local lock table. The production default when locks do not need
/// to survive a restart.
pub struct InMemoryLockStore {
    // Map of object id -> lock row
    locks: HashMap<ObjectId, Lock>,
}

impl InMemoryLockStore {
    pub fn new() -> Self {
        Self {
            locks: HashMap::new(),
        }
    }
}

impl Default for InMemoryLockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LockStore for InMemoryLockStore {
    fn get(&self, id: &ObjectId) -> Option<Lock> {
        self.locks.get(id).cloned()
    }

    fn put(&mut self, lock: Lock) {
        self.locks.insert(lock.object_id.clone(), lock);
    }

    fn remove(&mut self, id: &ObjectId) -> bool {
        self.locks.remove(id).is_some()
    }

    fn scan(&self, predicate: &dyn Fn(&Lock) -> bool) -> Vec<Lock> {
        self.locks
            .values()
            .filter(|l| predicate(l))
            .cloned()
            .collect()
    }

    fn len(&self) -> usize {
        self.locks.len()
    }
}
