//! Transition hook registry: insertion-ordered observer lists.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::coordinator::ReplicationCoordinator;
use crate::error::ZoneError;

/// A transition observer. Receives the coordinator that fired it.
pub type ZoneHook =
    dyn Fn(&ReplicationCoordinator) -> Result<(), ZoneError> + Send + Sync;

/// Which transition a hook observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Fired on passive → active transitions.
    Active,
    /// Fired on active → passive transitions.
    Passive,
}

/// Insertion-ordered lists of transition hooks, one per polarity.
///
/// Appends take a short lock; dispatch clones a snapshot out under the lock
/// and iterates outside it, so concurrent registration cannot disturb an
/// in-flight dispatch.
#[derive(Default)]
pub struct HookRegistry {
    active: Mutex<Vec<Arc<ZoneHook>>>,
    passive: Mutex<Vec<Arc<ZoneHook>>>,
}

impl HookRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn list(&self, polarity: Polarity) -> &Mutex<Vec<Arc<ZoneHook>>> {
        match polarity {
            Polarity::Active => &self.active,
            Polarity::Passive => &self.passive,
        }
    }

    /// Append a hook to the list of its polarity.
    pub fn append(&self, polarity: Polarity, hook: Arc<ZoneHook>) {
        self.list(polarity).lock().push(hook);
    }

    /// Snapshot of one list, in insertion order.
    pub fn snapshot(&self, polarity: Polarity) -> Vec<Arc<ZoneHook>> {
        self.list(polarity).lock().clone()
    }

    /// Remove every hook from both lists.
    pub fn clear(&self) {
        self.active.lock().clear();
        self.passive.lock().clear();
    }
}
