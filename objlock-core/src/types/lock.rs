use serde::{Deserialize, Serialize};

use super::{ObjectId, Version};

/// An exclusive, time-bound lock on one protected object.
///
/// At most one row exists per `object_id`. A lock is active while
/// `now < expires_at`; past that it is logically gone even if the row has not
/// been physically removed yet (lazy expiration).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lock {
    /// The protected object this lock serializes edits to.
    pub object_id: ObjectId,
    /// Session the lock was acquired from.
    pub session: String,
    /// User holding the lock.
    pub locker: String,
    /// Object version at lock/extension time, if the object is versioned.
    pub version: Version,
    /// When the lock was acquired (ms since epoch).
    pub acquired_at: u64,
    /// When the lease runs out (acquired_at + lease interval).
    pub expires_at: u64,
}

impl Lock {
    pub fn new(
        object_id: ObjectId,
        session: impl Into<String>,
        locker: impl Into<String>,
        version: Version,
        lease_interval_ms: u64,
        now: u64,
    ) -> Self {
        Self {
            object_id,
            session: session.into(),
            locker: locker.into(),
            version,
            acquired_at: now,
            expires_at: now + lease_interval_ms,
        }
    }

    /// A lock is active strictly before its expiry instant.
    pub fn is_active(&self, now: u64) -> bool {
        now < self.expires_at
    }

    /// Milliseconds left on the lease, zero once expired.
    pub fn remaining_ms(&self, now: u64) -> u64 {
        self.expires_at.saturating_sub(now)
    }

    /// Exact owner match: both session and locker must agree.
    pub fn is_owned_by(&self, session: &str, locker: &str) -> bool {
        self.session == session && self.locker == locker
    }

    /// Same user, regardless of which session acquired the lock.
    pub fn is_held_by_locker(&self, locker: &str) -> bool {
        self.locker == locker
    }
}
