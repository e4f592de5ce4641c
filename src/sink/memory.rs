//! In-process sink that records every batch it accepts.
//!
//! Used by the test suites and by embedders that want to inspect batching
//! without a database. Failure injection rejects one chosen batch number.

use super::{Sink, SinkError, SinkResult};
use crate::constants::sinks;
use crate::types::Batch;
use async_trait::async_trait;
use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct MemorySink {
    accepted: Mutex<Vec<Batch>>,
    attempts: Mutex<Vec<u64>>,
    fail_on_batch: Option<u64>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the batch with this 1-based number
    pub fn failing_on(batch_number: u64) -> Self {
        Self {
            fail_on_batch: Some(batch_number),
            ..Self::default()
        }
    }

    /// Batches accepted so far, in dispatch order
    pub fn batches(&self) -> Vec<Batch> {
        self.accepted.lock().clone()
    }

    /// Accepted batches as plain strings
    pub fn batch_contents(&self) -> Vec<Vec<String>> {
        self.accepted.lock().iter().map(Batch::to_strings).collect()
    }

    /// Every batch number passed to `enqueue`, including rejected ones
    pub fn attempts(&self) -> Vec<u64> {
        self.attempts.lock().clone()
    }

    pub fn item_count(&self) -> usize {
        self.accepted.lock().iter().map(Batch::len).sum()
    }
}

#[async_trait]
impl Sink for MemorySink {
    fn describe(&self) -> String {
        sinks::MEMORY.to_string()
    }

    async fn enqueue(&self, batch: Batch) -> SinkResult<()> {
        self.attempts.lock().push(batch.number());

        if self.fail_on_batch == Some(batch.number()) {
            return Err(SinkError::rejected(format!(
                "injected failure for batch {}",
                batch.number()
            )));
        }

        self.accepted.lock().push(batch);
        Ok(())
    }
}
