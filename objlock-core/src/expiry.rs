use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::LockError;
use crate::types::Lock;

/// Default lease interval granted by create and by create-as-extend.
///
/// The editing UI extends well inside this window (heartbeat cadence), so two
/// minutes keeps stale locks short-lived without racing a healthy client.
/// Deployments with slower heartbeats construct the policy with a custom
/// interval instead.
pub const DEFAULT_LEASE_INTERVAL_MS: u64 = 120_000;

/// Smallest interval an explicit extend may request.
pub const MIN_EXTEND_INTERVAL_MS: u64 = 1_000;

/// Millisecond clock the service reads lease time from.
/// Injected so tests can drive expiry deterministically.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Wall clock, the production default.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Decides whether a stored lock is still valid at a given instant and how
/// long fresh leases run.
#[derive(Debug, Clone, Copy)]
pub struct ExpirationPolicy {
    lease_interval_ms: u64,
}

impl ExpirationPolicy {
    pub fn new() -> Self {
        Self {
            lease_interval_ms: DEFAULT_LEASE_INTERVAL_MS,
        }
    }

    pub fn with_lease_interval(lease_interval_ms: u64) -> Self {
        Self { lease_interval_ms }
    }

    pub fn lease_interval_ms(&self) -> u64 {
        self.lease_interval_ms
    }

    pub fn is_active(&self, lock: &Lock, now: u64) -> bool {
        lock.is_active(now)
    }

    pub fn remaining_ms(&self, lock: &Lock, now: u64) -> u64 {
        lock.remaining_ms(now)
    }

    /// Expiry instant of a lease granted at `now`.
    pub fn expires_at(&self, now: u64) -> u64 {
        now + self.lease_interval_ms
    }

    /// Refreshed expiry for an existing lock: a lease is never shortened, so
    /// the new instant is floored at the current one.
    pub fn refreshed_expires_at(&self, lock: &Lock, now: u64, interval_ms: u64) -> u64 {
        (now + interval_ms).max(lock.expires_at)
    }

    pub fn validate_extend_interval(interval_ms: u64) -> Result<(), LockError> {
        if interval_ms < MIN_EXTEND_INTERVAL_MS {
            return Err(LockError::InvalidInterval { interval_ms });
        }
        Ok(())
    }
}

impl Default for ExpirationPolicy {
    fn default() -> Self {
        Self::new()
    }
}
