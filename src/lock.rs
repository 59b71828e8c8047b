//! Share lock: read/write lock with a non-blocking exclusive acquire.
//!
//! The coordinator uses the exclusive side to elect exactly one thread to
//! run the (possibly slow) first sample. Racing threads that lose the
//! election take a momentary shared lease, which stalls them until the
//! winner releases, so they return to a freshly populated cache.

use parking_lot::{RwLock, RwLockWriteGuard};

/// Exclusive access to a [`ShareLock`]; released on drop.
pub type ExclusiveGuard<'a> = RwLockWriteGuard<'a, ()>;

/// Read/write lock with a non-blocking exclusive acquire.
///
/// Shared leases may coexist; a shared lease blocks while the exclusive
/// guard is held, and vice versa.
#[derive(Debug, Default)]
pub struct ShareLock {
    gate: RwLock<()>,
}

impl ShareLock {
    /// Create an unheld lock.
    pub fn new() -> Self {
        Self {
            gate: RwLock::new(()),
        }
    }

    /// Attempt to acquire exclusive access without blocking.
    ///
    /// Returns `None` immediately if any holder, shared or exclusive, is
    /// present.
    pub fn try_exclusive(&self) -> Option<ExclusiveGuard<'_>> {
        self.gate.try_write()
    }

    /// Acquire exclusive access, blocking until granted.
    pub fn exclusive(&self) -> ExclusiveGuard<'_> {
        self.gate.write()
    }

    /// Run `f` under a shared lease.
    ///
    /// Blocks while the exclusive guard is held, which makes an empty `f` a
    /// cheap barrier for waiting out an in-flight exclusive section.
    pub fn sharing<R>(&self, f: impl FnOnce() -> R) -> R {
        let _lease = self.gate.read();
        f()
    }
}
