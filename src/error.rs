//! # Enqueue Error Types
//!
//! Crate-level error taxonomy. Every variant is fatal for a single run: the
//! binary logs it and exits non-zero.

use crate::config::ConfigurationError;
use crate::sink::SinkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnqueueError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Failed to resolve queue '{queue_identifier}' for environment '{environment}': {reason}")]
    Resolution {
        queue_identifier: String,
        environment: String,
        reason: String,
    },

    #[error("Failed to read input at line {line}: {source}")]
    InputRead {
        line: u64,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Sink '{sink}' rejected batch {batch_number} ({item_count} items); \
         {items_flushed} items in {batches_flushed} earlier batches remain enqueued: {source}"
    )]
    SinkFailure {
        sink: String,
        batch_number: u64,
        item_count: usize,
        batches_flushed: u64,
        items_flushed: u64,
        #[source]
        source: SinkError,
    },

    #[error("Dispatcher is done and accepts no further items")]
    DispatcherClosed,
}

impl EnqueueError {
    /// Create a resolution error
    pub fn resolution(
        queue_identifier: impl Into<String>,
        environment: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Resolution {
            queue_identifier: queue_identifier.into(),
            environment: environment.into(),
            reason: reason.into(),
        }
    }

    /// Create an input read error for the given 1-based line number
    pub fn input_read(line: u64, source: std::io::Error) -> Self {
        Self::InputRead { line, source }
    }

    /// Whether the failure was already logged where it happened
    pub fn logged_at_source(&self) -> bool {
        matches!(self, Self::SinkFailure { .. })
    }

    /// Batch number the sink rejected, if this is a sink failure
    pub fn failed_batch(&self) -> Option<u64> {
        match self {
            Self::SinkFailure { batch_number, .. } => Some(*batch_number),
            _ => None,
        }
    }
}

pub type EnqueueResult<T> = Result<T, EnqueueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_error_display() {
        let err = EnqueueError::resolution("puush", "staging", "queue not found");
        let display = err.to_string();
        assert!(display.contains("puush"));
        assert!(display.contains("staging"));
        assert!(display.contains("queue not found"));
    }

    #[test]
    fn test_sink_failure_reports_batch() {
        let err = EnqueueError::SinkFailure {
            sink: "memory".to_string(),
            batch_number: 3,
            item_count: 10,
            batches_flushed: 2,
            items_flushed: 20,
            source: SinkError::rejected("boom"),
        };
        assert_eq!(err.failed_batch(), Some(3));
        assert!(err.logged_at_source());
        let display = err.to_string();
        assert!(display.contains("batch 3"));
        assert!(display.contains("20 items in 2 earlier batches"));
    }

    #[test]
    fn test_input_read_error_keeps_source() {
        use std::error::Error as _;

        let err = EnqueueError::input_read(
            7,
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed"),
        );
        assert!(err.to_string().contains("line 7"));
        assert!(err.source().is_some());
        assert_eq!(err.failed_batch(), None);
        assert!(!err.logged_at_source());
    }
}
