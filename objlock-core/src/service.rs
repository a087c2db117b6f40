//! The lock manager: create/extend/release/query over a pluggable store,
//! with per-object-id serialization of every check-then-act sequence.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::bulk::BulkOutcome;
use crate::error::LockError;
use crate::expiry::{Clock, ExpirationPolicy, SystemClock};
use crate::infrastructure::LockStore;
use crate::infrastructure_in_memory::InMemoryLockStore;
use crate::types::{Lock, ObjectId, Version};

/// A structurally valid session id is non-blank. The session allocator is
/// external; this is the only shape check the lock core performs.
fn valid_session(session: &str) -> bool {
    !session.trim().is_empty()
}

/// Serializes concurrent edits to protected objects via lease-based
/// exclusive locks.
///
/// Constructed explicitly and passed to callers; there is no process-wide
/// singleton. All operations are safe to call from concurrent threads:
/// mutations on the same object id are serialized by a per-id guard,
/// different ids proceed independently, and no guard is held across a whole
/// bulk batch.
pub struct LockService {
    store: RwLock<Box<dyn LockStore + Send + Sync>>,
    // Per-object-id guards around "read current row, then mutate"
    guards: DashMap<ObjectId, Arc<Mutex<()>>>,
    policy: ExpirationPolicy,
    clock: Arc<dyn Clock>,
}

impl LockService {
    /// In-memory store, default lease policy, wall clock.
    pub fn new() -> Self {
        Self::with_store(Box::new(InMemoryLockStore::new()))
    }

    pub fn with_store(store: Box<dyn LockStore + Send + Sync>) -> Self {
        Self {
            store: RwLock::new(store),
            guards: DashMap::new(),
            policy: ExpirationPolicy::new(),
            clock: Arc::new(SystemClock),
        }
    }

    /// A service persisting locks to SQLite at the given path.
    #[cfg(feature = "sqlite")]
    pub fn with_sqlite(path: &str) -> Result<Self, rusqlite::Error> {
        let store = crate::infrastructure_sqlite::SqliteLockStore::open(path)?;
        Ok(Self::with_store(Box::new(store)))
    }

    pub fn policy(mut self, policy: ExpirationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // ─── Create ─────────────────────────────────────────────────────────────

    /// Acquire locks for a batch of object ids on behalf of
    /// `(session, locker)`. Each id is handled independently; a failed id
    /// never aborts the rest of the batch.
    ///
    /// Per id: an absent or expired row is replaced by a fresh lock with the
    /// default lease; a lock already owned by the caller is extended in
    /// place; a lock held by the same user from another session is
    /// transferred when `override_lock` is set; anything else fails with
    /// [`LockError::AlreadyLocked`].
    ///
    /// `versions` pairs positionally with `ids`; missing tail entries count
    /// as absent.
    pub fn create_locks(
        &self,
        ids: &[ObjectId],
        session: &str,
        locker: &str,
        versions: &[Version],
        override_lock: bool,
    ) -> BulkOutcome {
        let mut outcome = BulkOutcome::with_capacity(ids.len());
        for (pos, id) in ids.iter().enumerate() {
            let version = versions.get(pos).copied().flatten();
            match self.create_one(id, session, locker, version, override_lock) {
                Ok(lock) => outcome.record_ok(lock),
                Err(err) => outcome.record_err(id.clone(), err),
            }
        }
        outcome
    }

    /// Single-id convenience over [`LockService::create_locks`].
    pub fn create_lock(
        &self,
        id: &ObjectId,
        session: &str,
        locker: &str,
        version: Version,
        override_lock: bool,
    ) -> Result<Lock, LockError> {
        self.create_locks(std::slice::from_ref(id), session, locker, &[version], override_lock)
            .into_single(id)
    }

    fn create_one(
        &self,
        id: &ObjectId,
        session: &str,
        locker: &str,
        version: Version,
        override_lock: bool,
    ) -> Result<Lock, LockError> {
        if !valid_session(session) {
            return Err(LockError::InvalidSession { id: id.clone() });
        }

        let guard = self.guard_for(id);
        let _held = guard.lock();
        let now = self.clock.now_ms();

        match self.active_lock_row(id, now) {
            // Unlocked, or only a stale row left behind: take it over.
            None => {
                let lock = Lock::new(
                    id.clone(),
                    session,
                    locker,
                    version,
                    self.policy.lease_interval_ms(),
                    now,
                );
                self.store.write().put(lock.clone());
                debug!(object_id = %id, locker, session, "lock acquired");
                Ok(lock)
            }
            Some(mut current) if current.is_owned_by(session, locker) => {
                // Re-create by the same owner behaves as an extend.
                current.expires_at =
                    self.policy
                        .refreshed_expires_at(&current, now, self.policy.lease_interval_ms());
                if version.is_some() {
                    current.version = version;
                }
                self.store.write().put(current.clone());
                debug!(object_id = %id, locker, session, "lock refreshed via create");
                Ok(current)
            }
            Some(current) if current.is_held_by_locker(locker) && override_lock => {
                // Same user from a new session: transfer on explicit request.
                let lock = Lock::new(
                    id.clone(),
                    session,
                    locker,
                    version.or(current.version),
                    self.policy.lease_interval_ms(),
                    now,
                );
                self.store.write().put(lock.clone());
                info!(
                    object_id = %id,
                    locker,
                    from_session = %current.session,
                    to_session = session,
                    "lock transferred to new session"
                );
                Ok(lock)
            }
            Some(current) => Err(LockError::AlreadyLocked {
                id: id.clone(),
                locker: current.locker.clone(),
                remaining_ms: current.remaining_ms(now),
            }),
        }
    }

    // ─── Extend ─────────────────────────────────────────────────────────────

    /// Refresh the lease on a batch of already-held locks. Unlike create,
    /// every id must carry an active lock owned by `(session, locker)`.
    ///
    /// `interval_ms` below the minimum fails the whole request up front with
    /// [`LockError::InvalidInterval`]; per-id failures never abort the batch.
    pub fn extend_locks(
        &self,
        ids: &[ObjectId],
        session: &str,
        locker: &str,
        versions: &[Version],
        interval_ms: u64,
    ) -> Result<BulkOutcome, LockError> {
        ExpirationPolicy::validate_extend_interval(interval_ms)?;

        let mut outcome = BulkOutcome::with_capacity(ids.len());
        for (pos, id) in ids.iter().enumerate() {
            let version = versions.get(pos).copied().flatten();
            match self.extend_one(id, session, locker, version, interval_ms) {
                Ok(lock) => outcome.record_ok(lock),
                Err(err) => outcome.record_err(id.clone(), err),
            }
        }
        Ok(outcome)
    }

    /// Single-id convenience over [`LockService::extend_locks`].
    pub fn extend_lock(
        &self,
        id: &ObjectId,
        session: &str,
        locker: &str,
        version: Version,
        interval_ms: u64,
    ) -> Result<Lock, LockError> {
        self.extend_locks(std::slice::from_ref(id), session, locker, &[version], interval_ms)?
            .into_single(id)
    }

    fn extend_one(
        &self,
        id: &ObjectId,
        session: &str,
        locker: &str,
        version: Version,
        interval_ms: u64,
    ) -> Result<Lock, LockError> {
        if !valid_session(session) {
            return Err(LockError::InvalidSession { id: id.clone() });
        }

        let guard = self.guard_for(id);
        let _held = guard.lock();
        let now = self.clock.now_ms();

        match self.active_lock_row(id, now) {
            None => Err(LockError::NotLocked { id: id.clone() }),
            Some(current) if !current.is_owned_by(session, locker) => {
                Err(LockError::LockedBySomebodyElse {
                    id: id.clone(),
                    locker: current.locker.clone(),
                    remaining_ms: current.remaining_ms(now),
                })
            }
            Some(mut current) => {
                current.expires_at = self.policy.refreshed_expires_at(&current, now, interval_ms);
                if version.is_some() {
                    current.version = version;
                }
                self.store.write().put(current.clone());
                debug!(object_id = %id, locker, session, interval_ms, "lease extended");
                Ok(current)
            }
        }
    }

    // ─── Release ────────────────────────────────────────────────────────────

    /// Remove the stored row matching this lock's object and owner.
    ///
    /// Always legal and idempotent: a missing row, or a row that has since
    /// been taken over by another owner, is left alone silently.
    pub fn release_lock(&self, lock: &Lock) {
        let guard = self.guard_for(&lock.object_id);
        {
            let _held = guard.lock();

            let mut store = self.store.write();
            if let Some(current) = store.get(&lock.object_id) {
                if current.is_owned_by(&lock.session, &lock.locker) {
                    store.remove(&lock.object_id);
                    debug!(object_id = %lock.object_id, locker = %lock.locker, "lock released");
                }
            }
        }
        drop(guard);
        self.prune_guard(&lock.object_id);
    }

    pub fn release_locks(&self, locks: &[Lock]) {
        for lock in locks {
            self.release_lock(lock);
        }
    }

    // ─── Query ──────────────────────────────────────────────────────────────

    /// The active lock on an object, whoever holds it.
    pub fn find_lock_by_object_id(&self, id: &ObjectId) -> Option<Lock> {
        let now = self.clock.now_ms();
        self.active_lock_row(id, now)
    }

    /// The active lock on an object only if `(session, locker)` owns it.
    /// The "is my lock still valid" check.
    pub fn find_lock_for_owner(&self, id: &ObjectId, session: &str, locker: &str) -> Option<Lock> {
        self.find_lock_by_object_id(id)
            .filter(|l| l.is_owned_by(session, locker))
    }

    /// Subset of `ids` actively locked by `(session, locker)`, in input
    /// order. May be shorter than the input.
    pub fn find_locks_by_object_ids(
        &self,
        ids: &[ObjectId],
        session: &str,
        locker: &str,
    ) -> Vec<Lock> {
        ids.iter()
            .filter_map(|id| self.find_lock_for_owner(id, session, locker))
            .collect()
    }

    /// Every active lock held by `(session, locker)`.
    pub fn find_locks_by_user(&self, session: &str, locker: &str) -> Vec<Lock> {
        let now = self.clock.now_ms();
        self.store
            .read()
            .scan(&|l| l.is_active(now) && l.is_owned_by(session, locker))
    }

    /// Strict load: every id must carry an active lock (any owner), or the
    /// whole call fails with [`LockError::NotLocked`] for the first
    /// unresolved id.
    pub fn load_locks_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<Lock>, LockError> {
        let now = self.clock.now_ms();
        ids.iter()
            .map(|id| {
                self.active_lock_row(id, now)
                    .ok_or_else(|| LockError::NotLocked { id: id.clone() })
            })
            .collect()
    }

    /// Every active lock, whoever holds it. Ops/inspection surface.
    pub fn find_active_locks(&self) -> Vec<Lock> {
        let now = self.clock.now_ms();
        self.store.read().scan(&|l| l.is_active(now))
    }

    /// Rows whose lease has run out, for external reclamation sweeps.
    /// Logically these are already gone everywhere else in the API.
    pub fn find_expired_locks(&self) -> Vec<Lock> {
        let now = self.clock.now_ms();
        self.store.read().scan(&|l| !l.is_active(now))
    }

    /// Physically remove expired rows. Observable behavior is unchanged
    /// (expired rows already count as absent); this just reclaims storage.
    /// Returns the number of rows removed.
    pub fn sweep_expired(&self) -> usize {
        let expired = self.find_expired_locks();
        let mut removed = 0;
        for lock in expired {
            let guard = self.guard_for(&lock.object_id);
            {
                let _held = guard.lock();
                let now = self.clock.now_ms();

                let mut store = self.store.write();
                // Re-check under the guard: the row may have been reacquired.
                if let Some(current) = store.get(&lock.object_id) {
                    if !current.is_active(now) && store.remove(&lock.object_id) {
                        removed += 1;
                    }
                }
            }
            drop(guard);
            self.prune_guard(&lock.object_id);
        }
        if removed > 0 {
            info!(removed, "swept expired lock rows");
        }
        removed
    }

    /// True iff an active lock on `id` is owned by exactly
    /// `(session, locker)`.
    pub fn is_locked_for(&self, id: &ObjectId, session: &str, locker: &str) -> bool {
        self.find_lock_for_owner(id, session, locker).is_some()
    }

    /// Stored object version of the active lock on `id`; absent when the
    /// protected type is unversioned. Fails with [`LockError::NotLocked`]
    /// when no active lock exists.
    pub fn get_locked_version(&self, id: &ObjectId) -> Result<Version, LockError> {
        self.find_lock_by_object_id(id)
            .map(|l| l.version)
            .ok_or_else(|| LockError::NotLocked { id: id.clone() })
    }

    // ─── Internals ──────────────────────────────────────────────────────────

    fn guard_for(&self, id: &ObjectId) -> Arc<Mutex<()>> {
        self.guards
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }

    /// Drop an id's guard entry once nobody holds a handle to it, so the
    /// registry does not grow with every id ever locked. The closure runs
    /// under the shard lock: a guard some thread has already cloned
    /// (strong_count > 1) stays, and a later `guard_for` simply re-inserts,
    /// so per-id mutual exclusion is unaffected.
    fn prune_guard(&self, id: &ObjectId) {
        self.guards
            .remove_if(id, |_, guard| Arc::strong_count(guard) == 1);
    }

    #[cfg(test)]
    pub(crate) fn guard_count(&self) -> usize {
        self.guards.len()
    }

    fn active_lock_row(&self, id: &ObjectId, now: u64) -> Option<Lock> {
        self.store
            .read()
            .get(id)
            .filter(|l| self.policy.is_active(l, now))
    }
}

impl Default for LockService {
    fn default() -> Self {
        Self::new()
    }
}
