//! Background polling timer.
//!
//! A lazily created, dedicated worker thread that fires the coordinator's
//! scheduled check at a fixed cadence. The handle records the pid that
//! spawned it: after a `fork()` the worker thread does not exist in the
//! child, so the child must discard the handle without signalling or
//! joining and spawn a fresh one.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick, Sender};

use crate::config::POLLER_THREAD_NAME;

/// Handle to the background polling thread.
pub struct PollingTimer {
    shutdown_tx: Sender<()>,
    join: Option<JoinHandle<()>>,
    pid: u32,
}

impl PollingTimer {
    /// Spawn the worker. `action` runs once per `interval` tick; it is
    /// expected to handle its own failures so the loop keeps ticking.
    pub fn spawn(interval: Duration, action: impl FnMut() + Send + 'static) -> Self {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let join = thread::Builder::new()
            .name(POLLER_THREAD_NAME.to_string())
            .spawn(move || {
                let mut action = action;
                let ticker = tick(interval);
                loop {
                    select! {
                        recv(shutdown_rx) -> _ => break,
                        recv(ticker) -> _ => action(),
                    }
                }
            })
            .expect("failed to spawn zonewatch poller thread");

        Self {
            shutdown_tx,
            join: Some(join),
            pid: std::process::id(),
        }
    }

    /// Pid of the process that spawned the worker.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Signal the worker and wait for it to finish. Idempotent.
    ///
    /// Joining is skipped when called from the worker thread itself (a hook
    /// stopping its own coordinator would otherwise self-join) and in a
    /// forked child, where neither the worker thread nor a safe channel
    /// state exists.
    pub fn shutdown(&mut self) {
        let same_process = self.pid == std::process::id();
        if same_process {
            let _ = self.shutdown_tx.try_send(());
        }
        if let Some(join) = self.join.take() {
            if same_process && thread::current().id() != join.thread().id() {
                let _ = join.join();
            }
        }
    }

    /// Discard the handle without touching the channel or the thread.
    ///
    /// For forked children: the channel's internals may have been
    /// mid-operation on another thread at fork time, so the child must not
    /// signal through it.
    pub fn forget(self) {
        std::mem::forget(self);
    }
}

impl Drop for PollingTimer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
