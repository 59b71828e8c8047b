//! # zonewatch
//!
//! A process-local replication coordinator: answers whether the current
//! deployment zone is the active (read/write authoritative) zone of a
//! multi-zone replicated system, or a passive (read-mostly) zone.
//!
//! ## Features
//!
//! - **Periodic sampling** of a caller-supplied zone probe on a dedicated
//!   background thread, with a configurable cadence (default 5 s)
//! - **Lock-free cached reads** of the zone flag and its sample timestamp
//! - **Thundering-herd guard**: however many threads race into the first
//!   observation, the probe runs exactly once
//! - **Transition hooks** fired in registration order on active ⇄ passive
//!   switches, with per-hook failure isolation
//! - **Fork discipline**: a forked child transparently restarts the poller
//!   on its next observation
//! - **Always-active variant** for single-zone deployments, with the
//!   poller disabled
//!
//! ## Architecture
//!
//! ```text
//! active_zone() → check() → ShareLock (one winner) → ZoneProbe (external)
//!                                     → ZoneCell (atomic publish)
//!                                     → transition detection → hooks
//! PollingTimer (background thread) → check() at polling_interval
//! ```
//!
//! Strictly observational: the coordinator reports what its probe reports
//! and provides no cluster-wide agreement, leader election, or fencing.

/// Compile-time defaults: polling cadence, error-report source tag.
pub mod config;
/// Coordinator façade: cached observations, monitoring lifecycle, and hook dispatch.
pub mod coordinator;
/// Error type shared by probes, hooks, and the façade.
pub mod error;
/// Executor and error-reporter capabilities supplied by the host application.
pub mod executor;
/// Transition hook registry: insertion-ordered observer lists.
pub mod hooks;
/// Share lock: read/write lock with a non-blocking exclusive acquire.
pub mod lock;
/// Zone probe strategy and the built-in always-active probe.
pub mod probe;
/// Cached zone state: tri-state activity flag and sample timestamp.
pub mod state;
/// Background polling timer.
pub mod timer;
