//! Cached zone state: tri-state activity flag plus sample timestamp.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const STATE_UNSAMPLED: u8 = 0;
const STATE_PASSIVE: u8 = 1;
const STATE_ACTIVE: u8 = 2;

/// Cached activity of the current zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneState {
    /// No sample has been taken yet.
    Unsampled,
    /// The last sample reported this zone as passive.
    Passive,
    /// The last sample reported this zone as active.
    Active,
}

impl ZoneState {
    /// `Some(true)` for `Active`, `Some(false)` for `Passive`, `None` for
    /// the sentinel.
    pub fn is_active(self) -> Option<bool> {
        match self {
            ZoneState::Unsampled => None,
            ZoneState::Passive => Some(false),
            ZoneState::Active => Some(true),
        }
    }

    fn from_raw(raw: u8) -> Self {
        match raw {
            STATE_PASSIVE => ZoneState::Passive,
            STATE_ACTIVE => ZoneState::Active,
            _ => ZoneState::Unsampled,
        }
    }
}

/// Lock-free cell holding the cached zone flag and its sample timestamp.
///
/// Writes happen only under the coordinator's exclusive lock. Reads are
/// lock-free: the Release store of the state pairs with the Acquire load in
/// [`load`](ZoneCell::load), so a reader that observes a non-sentinel state
/// also observes the timestamp written by that (or a later) sample.
#[derive(Debug, Default)]
pub struct ZoneCell {
    state: AtomicU8,
    /// Milliseconds since the Unix epoch of the most recent sample.
    updated_at_ms: AtomicU64,
}

impl ZoneCell {
    /// An unsampled cell.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(STATE_UNSAMPLED),
            updated_at_ms: AtomicU64::new(0),
        }
    }

    /// Publish a fresh sample: timestamp first, then the state with Release
    /// ordering.
    pub fn publish(&self, active: bool, at: SystemTime) {
        let ms = at
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        let raw = if active { STATE_ACTIVE } else { STATE_PASSIVE };
        self.updated_at_ms.store(ms, Ordering::Relaxed);
        self.state.store(raw, Ordering::Release);
    }

    /// Current cached state.
    pub fn load(&self) -> ZoneState {
        ZoneState::from_raw(self.state.load(Ordering::Acquire))
    }

    /// Whether any sample has been published.
    pub fn is_sampled(&self) -> bool {
        self.load() != ZoneState::Unsampled
    }

    /// Timestamp of the most recent sample; `None` before the first.
    pub fn updated_at(&self) -> Option<SystemTime> {
        match self.load() {
            ZoneState::Unsampled => None,
            _ => {
                let ms = self.updated_at_ms.load(Ordering::Relaxed);
                Some(UNIX_EPOCH + Duration::from_millis(ms))
            }
        }
    }
}
