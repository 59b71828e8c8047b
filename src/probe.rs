//! Zone probe strategy: decides whether the current zone is active.

use crate::error::ZoneError;

/// Strategy deciding whether the current deployment zone is the active
/// (read/write) zone.
///
/// Implementations are free to be expensive: a database probe, a marker
/// file lookup, a DNS trick. The coordinator serializes invocations and
/// caches the result, so a probe is never called concurrently with itself
/// from within a single coordinator.
pub trait ZoneProbe: Send + Sync {
    /// Determine whether the current zone is active.
    ///
    /// Errors propagate to foreground callers; on the background polling
    /// path they are reported and logged, and the cache keeps its previous
    /// value.
    fn fetch_active_zone(&self) -> Result<bool, ZoneError>;
}

impl<F> ZoneProbe for F
where
    F: Fn() -> Result<bool, ZoneError> + Send + Sync,
{
    fn fetch_active_zone(&self) -> Result<bool, ZoneError> {
        self()
    }
}

/// Probe that reports the zone as active unconditionally.
///
/// Backs [`ReplicationCoordinator::always_active`], the variant for
/// single-zone deployments where there is nothing to poll.
///
/// [`ReplicationCoordinator::always_active`]: crate::coordinator::ReplicationCoordinator::always_active
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysActiveZone;

impl ZoneProbe for AlwaysActiveZone {
    fn fetch_active_zone(&self) -> Result<bool, ZoneError> {
        Ok(true)
    }
}
