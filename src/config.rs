//! Compile-time defaults for the replication coordinator.
//!
//! Runtime configuration is handled through
//! [`CoordinatorBuilder`](crate::coordinator::CoordinatorBuilder).

/// Default interval (in seconds) between scheduled zone samples.
pub const DEFAULT_POLLING_INTERVAL_SECS: u64 = 5;

/// Source tag attached to failures forwarded to an
/// [`ErrorReporter`](crate::executor::ErrorReporter).
pub const ERROR_SOURCE: &str = "replication_coordinator.zonewatch";

/// Name of the background polling thread.
pub const POLLER_THREAD_NAME: &str = "zonewatch-poller";
