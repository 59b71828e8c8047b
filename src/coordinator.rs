//! Coordinator façade: cached zone observations, monitoring lifecycle, and
//! transition hook dispatch.

use std::process;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;

use crate::config::{DEFAULT_POLLING_INTERVAL_SECS, ERROR_SOURCE};
use crate::error::ZoneError;
use crate::executor::SampleExecutor;
use crate::hooks::{HookRegistry, Polarity, ZoneHook};
use crate::lock::ShareLock;
use crate::probe::{AlwaysActiveZone, ZoneProbe};
use crate::state::{ZoneCell, ZoneState};
use crate::timer::PollingTimer;

/// Process-local replication coordinator.
///
/// Samples a [`ZoneProbe`] on a periodic cadence, caches whether the
/// current deployment zone is the active (read/write) zone, and fires
/// registered hooks on transitions. Strictly observational: it reports
/// what its probe reports and provides no cluster-wide agreement.
///
/// Cloning is cheap; clones share all state, so one coordinator is
/// typically built at startup and handed around by clone.
#[derive(Clone)]
pub struct ReplicationCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    polling_interval: Duration,
    probe: Arc<dyn ZoneProbe>,
    executor: Option<Arc<dyn SampleExecutor>>,
    cell: ZoneCell,
    lock: ShareLock,
    hooks: HookRegistry,
    timer: Mutex<Option<PollingTimer>>,
    scheduler_enabled: bool,
}

/// Builder for [`ReplicationCoordinator`].
pub struct CoordinatorBuilder {
    polling_interval: Duration,
    probe: Arc<dyn ZoneProbe>,
    executor: Option<Arc<dyn SampleExecutor>>,
    scheduler_enabled: bool,
}

impl CoordinatorBuilder {
    fn new(probe: Arc<dyn ZoneProbe>) -> Self {
        Self {
            polling_interval: Duration::from_secs(DEFAULT_POLLING_INTERVAL_SECS),
            probe,
            executor: None,
            scheduler_enabled: true,
        }
    }

    /// Cadence of the background sampler. Default 5 seconds.
    pub fn polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = interval;
        self
    }

    /// Wrap every probe invocation in the host application's unit of work.
    pub fn executor(mut self, executor: Arc<dyn SampleExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Build the coordinator. The background poller is not started here;
    /// the first observation starts it.
    pub fn build(self) -> ReplicationCoordinator {
        ReplicationCoordinator {
            inner: Arc::new(CoordinatorInner {
                polling_interval: self.polling_interval,
                probe: self.probe,
                executor: self.executor,
                cell: ZoneCell::new(),
                lock: ShareLock::new(),
                hooks: HookRegistry::new(),
                timer: Mutex::new(None),
                scheduler_enabled: self.scheduler_enabled,
            }),
        }
    }
}

impl ReplicationCoordinator {
    /// Coordinator with default settings around `probe`.
    pub fn new(probe: impl ZoneProbe + 'static) -> Self {
        Self::builder(probe).build()
    }

    /// Start configuring a coordinator around `probe`.
    pub fn builder(probe: impl ZoneProbe + 'static) -> CoordinatorBuilder {
        CoordinatorBuilder::new(Arc::new(probe))
    }

    /// Coordinator for single-zone deployments: the probe reports active
    /// unconditionally and no background poller is ever created.
    pub fn always_active() -> Self {
        let mut builder = CoordinatorBuilder::new(Arc::new(AlwaysActiveZone));
        builder.scheduler_enabled = false;
        builder.build()
    }

    /// Cadence of the background sampler.
    pub fn polling_interval(&self) -> Duration {
        self.inner.polling_interval
    }

    /// Whether the current zone is the active (read/write) zone.
    ///
    /// The first call seeds the cache (one probe invocation no matter how
    /// many threads race here) and starts the background poller. Probe
    /// failures during that first sample propagate to the caller. Once
    /// seeded this is a lock-free cached read.
    pub fn active_zone(&self) -> Result<bool, ZoneError> {
        self.check(true)?;
        self.ensure_monitoring();
        Ok(self.inner.cell.load().is_active().unwrap_or(false))
    }

    /// Timestamp of the most recent sample; `None` before the first.
    pub fn updated_at(&self) -> Option<SystemTime> {
        self.inner.cell.updated_at()
    }

    /// Seed the cache and start the background poller. Idempotent.
    pub fn start_monitoring(&self) -> Result<(), ZoneError> {
        self.check(true)?;
        self.ensure_monitoring();
        Ok(())
    }

    /// Shut the background poller down. Idempotent; an in-flight sample is
    /// allowed to complete.
    pub fn stop_monitoring(&self) {
        // Take the handle out before shutting down: joining while holding
        // the mutex would deadlock against a hook on the poller thread that
        // re-enters the monitoring path.
        let timer = self.inner.timer.lock().take();
        if let Some(mut timer) = timer {
            timer.shutdown();
        }
    }

    /// Whether a background poller is currently installed for this process.
    pub fn monitoring(&self) -> bool {
        self.inner
            .timer
            .lock()
            .as_ref()
            .is_some_and(|timer| timer.pid() == process::id())
    }

    /// Register `hook` to run on passive → active transitions.
    ///
    /// Starts monitoring, and if the zone is already active, invokes the
    /// hook synchronously exactly once so a late registrant still observes
    /// the current state.
    pub fn on_active_zone(
        &self,
        hook: impl Fn(&ReplicationCoordinator) -> Result<(), ZoneError> + Send + Sync + 'static,
    ) -> Result<(), ZoneError> {
        self.register_hook(Polarity::Active, Arc::new(hook))
    }

    /// Register `hook` to run on active → passive transitions.
    ///
    /// Starts monitoring, and if the zone is already passive, invokes the
    /// hook synchronously exactly once.
    pub fn on_passive_zone(
        &self,
        hook: impl Fn(&ReplicationCoordinator) -> Result<(), ZoneError> + Send + Sync + 'static,
    ) -> Result<(), ZoneError> {
        self.register_hook(Polarity::Passive, Arc::new(hook))
    }

    /// Remove every registered hook. The cache and the poller are
    /// untouched; a dispatch already in flight still runs its snapshot.
    pub fn clear_hooks(&self) {
        self.inner.hooks.clear();
    }

    fn register_hook(&self, polarity: Polarity, hook: Arc<ZoneHook>) -> Result<(), ZoneError> {
        self.start_monitoring()?;
        self.inner.hooks.append(polarity, Arc::clone(&hook));

        let matches = match polarity {
            Polarity::Active => self.inner.cell.load() == ZoneState::Active,
            Polarity::Passive => self.inner.cell.load() == ZoneState::Passive,
        };
        if matches {
            self.run_hook(&hook);
        }
        Ok(())
    }

    /// Core state-update routine.
    ///
    /// With `skip_when_set`, returns immediately once the cache is seeded.
    /// Otherwise one thread wins the non-blocking exclusive acquire and
    /// samples the probe; every loser takes a momentary shared lease, which
    /// stalls it until the winner has published. However many threads race
    /// into a cold cache, the probe runs once and all of them return to a
    /// freshly populated cache.
    fn check(&self, skip_when_set: bool) -> Result<(), ZoneError> {
        if skip_when_set && self.inner.cell.is_sampled() {
            return Ok(());
        }
        match self.inner.lock.try_exclusive() {
            Some(guard) => {
                // A racer may have published between the cheap check above
                // and winning the lock.
                if skip_when_set && self.inner.cell.is_sampled() {
                    return Ok(());
                }
                let old = self.inner.cell.load();
                let active = self.sample()?;
                self.inner.cell.publish(active, SystemTime::now());
                drop(guard);
                self.publish_transition(old, active);
            }
            None => {
                self.inner.lock.sharing(|| {});
            }
        }
        Ok(())
    }

    /// Invoke the probe, through the executor when one is configured.
    fn sample(&self) -> Result<bool, ZoneError> {
        let probe = &self.inner.probe;
        match &self.inner.executor {
            Some(executor) => executor.wrap(&mut || probe.fetch_active_zone()),
            None => probe.fetch_active_zone(),
        }
    }

    /// Fire hooks if `(old, active)` is a transition. The cache is already
    /// published and the exclusive lock released, so hooks observe the new
    /// value through the public API. The log line precedes dispatch.
    fn publish_transition(&self, old: ZoneState, active: bool) {
        if old.is_active() == Some(active) {
            return;
        }
        let pid = process::id();
        if active {
            tracing::info!("replication coordinator: pid {}: switching to active zone", pid);
            self.dispatch(Polarity::Active);
        } else {
            tracing::info!("replication coordinator: pid {}: switching to passive zone", pid);
            self.dispatch(Polarity::Passive);
        }
    }

    /// Run every hook of `polarity` over a snapshot of the list, in
    /// registration order, isolating failures so one failing hook cannot
    /// starve the rest.
    fn dispatch(&self, polarity: Polarity) {
        for hook in self.inner.hooks.snapshot(polarity) {
            self.run_hook(&hook);
        }
    }

    fn run_hook(&self, hook: &Arc<ZoneHook>) {
        if let Err(error) = hook(self) {
            self.report(&error);
            tracing::error!("{}: replication coordinator hook failed", error);
        }
    }

    /// One background tick: refresh the cache; a failure is reported and
    /// logged, never raised, so the poller keeps ticking and the cache
    /// keeps its previous value.
    fn scheduled_check(&self) {
        if let Err(error) = self.check(false) {
            self.report(&error);
            tracing::error!(
                "{}: could not check replication coordinator active zone",
                error
            );
        }
    }

    fn report(&self, error: &ZoneError) {
        if let Some(reporter) = self
            .inner
            .executor
            .as_ref()
            .and_then(|executor| executor.error_reporter())
        {
            reporter.report(error, false, ERROR_SOURCE);
        }
    }

    /// Make sure the background poller is running in this process.
    ///
    /// A handle spawned before a `fork()` refers to a worker thread that
    /// does not exist in the child; it is discarded without signalling or
    /// joining, and a fresh poller is spawned in its place.
    fn ensure_monitoring(&self) {
        if !self.inner.scheduler_enabled {
            return;
        }
        let mut timer = self.inner.timer.lock();
        if let Some(existing) = timer.as_ref() {
            if existing.pid() == process::id() {
                return;
            }
            if let Some(stale) = timer.take() {
                stale.forget();
            }
        }

        let weak = Arc::downgrade(&self.inner);
        *timer = Some(PollingTimer::spawn(self.inner.polling_interval, move || {
            if let Some(inner) = weak.upgrade() {
                ReplicationCoordinator { inner }.scheduled_check();
            }
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn active_probe() -> Result<bool, ZoneError> {
        Ok(true)
    }

    fn passive_probe() -> Result<bool, ZoneError> {
        Ok(false)
    }

    #[test]
    fn test_default_polling_interval() {
        let coordinator = ReplicationCoordinator::new(active_probe);
        assert_eq!(coordinator.polling_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_builder_interval_takes_precedence() {
        let coordinator = ReplicationCoordinator::builder(active_probe)
            .polling_interval(Duration::from_secs(1))
            .build();
        assert_eq!(coordinator.polling_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_updated_at_absent_until_sampled() {
        let coordinator = ReplicationCoordinator::new(active_probe);
        assert!(coordinator.updated_at().is_none());
        coordinator.start_monitoring().unwrap();
        assert!(coordinator.updated_at().is_some());
        coordinator.stop_monitoring();
    }

    #[test]
    fn test_active_zone_reports_probe_value() {
        let coordinator = ReplicationCoordinator::new(passive_probe);
        assert!(!coordinator.active_zone().unwrap());
        coordinator.stop_monitoring();

        let coordinator = ReplicationCoordinator::new(active_probe);
        assert!(coordinator.active_zone().unwrap());
        coordinator.stop_monitoring();
    }

    #[test]
    fn test_foreground_probe_error_propagates() {
        let coordinator =
            ReplicationCoordinator::new(|| Err::<bool, _>(ZoneError::new("probe down")));
        let err = coordinator.active_zone().unwrap_err();
        assert_eq!(err.message(), "probe down");
        // The failed sample must not touch the cache or start the poller.
        assert!(coordinator.updated_at().is_none());
        assert!(!coordinator.monitoring());
    }

    #[test]
    fn test_first_observation_dispatches_initial_transition() {
        let fired = Arc::new(AtomicUsize::new(0));
        let coordinator = ReplicationCoordinator::new(passive_probe);
        let counter = Arc::clone(&fired);
        // Registration seeds the cache; the unsampled → passive step is a
        // transition, and the late-registration rule then fires the hook
        // against the already-passive cache.
        coordinator
            .on_passive_zone(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        coordinator.stop_monitoring();
    }

    #[test]
    fn test_late_registration_of_opposite_polarity_stays_silent() {
        let fired = Arc::new(AtomicBool::new(false));
        let coordinator = ReplicationCoordinator::new(active_probe);
        let flag = Arc::clone(&fired);
        coordinator
            .on_passive_zone(move |_| {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
        assert!(!fired.load(Ordering::SeqCst));
        coordinator.stop_monitoring();
    }

    #[test]
    fn test_start_monitoring_is_idempotent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let coordinator = ReplicationCoordinator::builder(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ZoneError>(true)
        })
        .polling_interval(Duration::from_secs(9999))
        .build();

        coordinator.start_monitoring().unwrap();
        coordinator.start_monitoring().unwrap();
        assert!(coordinator.monitoring());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        coordinator.stop_monitoring();
    }

    #[test]
    fn test_stop_monitoring_is_idempotent() {
        let coordinator = ReplicationCoordinator::new(active_probe);
        coordinator.start_monitoring().unwrap();
        coordinator.stop_monitoring();
        coordinator.stop_monitoring();
        assert!(!coordinator.monitoring());
    }

    #[test]
    fn test_monitoring_restarts_after_stop() {
        let coordinator = ReplicationCoordinator::new(active_probe);
        coordinator.start_monitoring().unwrap();
        coordinator.stop_monitoring();
        coordinator.start_monitoring().unwrap();
        assert!(coordinator.monitoring());
        coordinator.stop_monitoring();
    }

    #[test]
    fn test_hooks_receive_the_coordinator() {
        let observed_active = Arc::new(AtomicBool::new(false));
        let coordinator = ReplicationCoordinator::new(active_probe);
        let flag = Arc::clone(&observed_active);
        coordinator
            .on_active_zone(move |coordinator| {
                flag.store(coordinator.active_zone()?, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
        assert!(observed_active.load(Ordering::SeqCst));
        coordinator.stop_monitoring();
    }

    #[test]
    fn test_clear_hooks_keeps_cache_and_poller() {
        let coordinator = ReplicationCoordinator::new(active_probe);
        coordinator.on_active_zone(|_| Ok(())).unwrap();
        coordinator.clear_hooks();
        assert!(coordinator.updated_at().is_some());
        assert!(coordinator.monitoring());
        coordinator.stop_monitoring();
    }

    #[test]
    fn test_always_active_variant() {
        let coordinator = ReplicationCoordinator::always_active();
        assert!(coordinator.active_zone().unwrap());
        assert!(!coordinator.monitoring());

        let active_fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&active_fired);
        coordinator
            .on_active_zone(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
        assert_eq!(active_fired.load(Ordering::SeqCst), 1);

        let passive_fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&passive_fired);
        coordinator
            .on_passive_zone(move |_| {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
        assert!(!passive_fired.load(Ordering::SeqCst));
        assert!(!coordinator.monitoring());
    }
}
