//! Error type shared by zone probes, transition hooks, and the coordinator
//! façade.

use std::error::Error;

/// Error raised while sampling a zone probe or running a transition hook.
///
/// Carries a human-readable message and, optionally, the underlying error
/// that caused it. Probe implementations build one with
/// [`with_source`](ZoneError::with_source) around whatever their backing
/// check (database query, file read, DNS lookup) returned.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ZoneError {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl ZoneError {
    /// Error from a message alone.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_and_display() {
        let err = ZoneError::new("zone lookup failed");
        assert_eq!(err.message(), "zone lookup failed");
        assert_eq!(err.to_string(), "zone lookup failed");
    }

    #[test]
    fn test_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "marker file missing");
        let err = ZoneError::with_source("zone lookup failed", io);
        let source = err.source().expect("source should be preserved");
        assert!(source.to_string().contains("marker file missing"));
    }

    #[test]
    fn test_no_source_by_default() {
        assert!(ZoneError::new("plain").source().is_none());
    }
}
