//! # Sinks
//!
//! A sink durably accepts whole batches. From the dispatcher's point of view
//! every call either persists the entire batch or fails it as a unit.
//!
//! - [`PgmqSink`]: PostgreSQL message queue (pgmq), one `send_batch` per batch
//! - [`DryRunSink`]: JSON lines on stdout, for inspecting what would be sent
//! - [`MemorySink`]: in-process recording sink with failure injection

pub mod dry_run;
pub mod memory;
pub mod pgmq;

use crate::types::Batch;
use async_trait::async_trait;
use thiserror::Error;

pub use dry_run::DryRunSink;
pub use memory::MemorySink;
pub use pgmq::{ItemMessage, ItemMessageMetadata, PgmqSink};

/// Destination for finalized batches.
///
/// Implementations need not be safe for concurrent `enqueue` calls; the
/// dispatcher keeps at most one in flight.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Short description used in logs and errors, e.g. `pgmq:puush_queue`
    fn describe(&self) -> String;

    /// Persist every item of `batch`, or fail the batch as a whole
    async fn enqueue(&self, batch: Batch) -> SinkResult<()>;
}

#[async_trait]
impl<S: Sink + ?Sized> Sink for Box<S> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    async fn enqueue(&self, batch: Batch) -> SinkResult<()> {
        (**self).enqueue(batch).await
    }
}

/// Sink-level failures
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Database error during {operation}: {message}")]
    Database { operation: String, message: String },

    #[error("Queue operation failed: {queue_name}: {operation}: {message}")]
    QueueOperation {
        queue_name: String,
        operation: String,
        message: String,
    },

    #[error("Message serialization error: {message}")]
    Serialization { message: String },

    #[error("Output error: {message}")]
    Output { message: String },

    #[error("Batch rejected: {reason}")]
    Rejected { reason: String },
}

impl SinkError {
    /// Create a database error
    pub fn database(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Database {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a queue operation error
    pub fn queue_operation(
        queue_name: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::QueueOperation {
            queue_name: queue_name.into(),
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a rejection error
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}

impl From<sqlx::Error> for SinkError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => SinkError::database("query", db_err.to_string()),
            sqlx::Error::PoolTimedOut => {
                SinkError::database("acquire", "timed out waiting for a pool connection")
            }
            sqlx::Error::PoolClosed => SinkError::database("acquire", "connection pool is closed"),
            other => SinkError::database("connection", other.to_string()),
        }
    }
}

impl From<serde_json::Error> for SinkError {
    fn from(err: serde_json::Error) -> Self {
        SinkError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        SinkError::Output {
            message: err.to_string(),
        }
    }
}

pub type SinkResult<T> = Result<T, SinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlx_error_conversion() {
        let err: SinkError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, SinkError::Database { ref operation, .. } if operation == "acquire"));

        let err: SinkError = sqlx::Error::PoolClosed.into();
        assert!(err.to_string().contains("closed"));
    }

    #[test]
    fn test_error_display() {
        let err = SinkError::queue_operation("puush_queue", "send_batch", "row count mismatch");
        let display = err.to_string();
        assert!(display.contains("puush_queue"));
        assert!(display.contains("send_batch"));
        assert!(display.contains("row count mismatch"));
    }

    #[tokio::test]
    async fn test_boxed_sink_delegates() {
        let boxed: Box<dyn Sink> = Box::new(MemorySink::new());
        let mut batch = Batch::new(1);
        batch.push(crate::types::Item::from_line("a").unwrap());
        boxed.enqueue(batch).await.unwrap();
        assert_eq!(boxed.describe(), "memory");
    }
}
