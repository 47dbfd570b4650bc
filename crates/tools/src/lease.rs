//! Session lease for tools with page side effects
//!
//! The engine calls tools on its own schedule, so a call can arrive after the
//! session it belongs to was stopped or dropped. Tools that write flags or
//! schedule navigation run their side effects through the lease; once the
//! controller revokes it, those effects never happen.

use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug)]
pub struct SessionLease {
    active: Mutex<bool>,
}

impl SessionLease {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            active: Mutex::new(true),
        })
    }

    /// Run `effect` only while the lease is held.
    ///
    /// The lease stays locked for the duration of `effect`, so `revoke`
    /// returns only after any in-flight effect has finished.
    pub fn run<R>(&self, effect: impl FnOnce() -> R) -> Option<R> {
        let active = self.active.lock();
        if *active {
            Some(effect())
        } else {
            None
        }
    }

    /// End the lease. Returns whether it was still active.
    pub fn revoke(&self) -> bool {
        std::mem::replace(&mut *self.active.lock(), false)
    }

    pub fn is_active(&self) -> bool {
        *self.active.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revoked_lease_skips_effects() {
        let lease = SessionLease::new();
        assert_eq!(lease.run(|| 7), Some(7));

        assert!(lease.revoke());
        assert!(!lease.revoke());
        assert!(!lease.is_active());
        assert_eq!(lease.run(|| 7), None);
    }
}
