//! Executor and error-reporter capabilities supplied by the host
//! application.

use std::sync::Arc;

use crate::error::ZoneError;

/// Receives failures the coordinator handled on behalf of the caller.
pub trait ErrorReporter: Send + Sync {
    /// Report `error`.
    ///
    /// `handled` is `false` when the coordinator swallowed the failure
    /// (background samples, hook failures). `source` is a stable tag
    /// identifying the reporting subsystem, see
    /// [`config::ERROR_SOURCE`](crate::config::ERROR_SOURCE).
    fn report(&self, error: &ZoneError, handled: bool, source: &str);
}

/// Wraps each probe invocation in the host application's unit of work:
/// request-scoped setup and teardown, thread-pool bookkeeping.
///
/// When no executor is configured the coordinator invokes the probe
/// directly.
pub trait SampleExecutor: Send + Sync {
    /// Run `sample` inside the executor's unit of work and return its
    /// result.
    fn wrap(
        &self,
        sample: &mut dyn FnMut() -> Result<bool, ZoneError>,
    ) -> Result<bool, ZoneError>;

    /// Reporter for failures on the background polling path.
    ///
    /// Defaults to `None`; failures are then only logged.
    fn error_reporter(&self) -> Option<Arc<dyn ErrorReporter>> {
        None
    }
}
