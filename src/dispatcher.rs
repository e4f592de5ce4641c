//! # Batch Dispatcher
//!
//! Accumulates items into fixed-capacity batches and hands each finalized
//! batch to a sink.
//!
//! ## State machine
//!
//! ```text
//!            push (len < capacity)
//!              ┌──────────┐
//!              ▼          │
//!        ┌──────────────┐─┘  len == capacity  ┌──────────┐
//!   ───► │ Accumulating │ ──────────────────► │ Flushing │
//!        └──────────────┘ ◄────────────────── └──────────┘
//!              │               sink ok             │
//!              │ finish                            │ sink error
//!              ▼                                   ▼
//!        ┌──────────────┐                    ┌──────────┐
//!        │ Flushing (if │ ─────────────────► │   Done   │
//!        │  non-empty)  │                    └──────────┘
//!        └──────────────┘
//! ```
//!
//! Flushes are awaited before the next item is accepted, so input order and
//! batch order always agree and at most one sink call is in flight.

use crate::config::ConfigurationError;
use crate::constants::DEFAULT_BATCH_CAPACITY;
use crate::error::{EnqueueError, EnqueueResult};
use crate::reader::LineReader;
use crate::sink::Sink;
use crate::types::{Batch, Item};
use futures::{Stream, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::io::AsyncBufRead;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatcherState {
    /// Appending items to the current batch
    Accumulating,
    /// Current batch handed to the sink, awaiting its result
    Flushing,
    /// End of stream reached or a flush failed; no further items accepted
    Done,
}

impl DispatcherState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl fmt::Display for DispatcherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accumulating => write!(f, "accumulating"),
            Self::Flushing => write!(f, "flushing"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Totals for the batches the sink accepted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub batches_flushed: u64,
    pub items_flushed: u64,
}

pub struct Dispatcher<'a, S: Sink + ?Sized> {
    sink: &'a S,
    capacity: usize,
    state: DispatcherState,
    current: Batch,
    batches_flushed: u64,
    items_flushed: u64,
}

impl<'a, S: Sink + ?Sized> Dispatcher<'a, S> {
    pub fn new(sink: &'a S, capacity: usize) -> EnqueueResult<Self> {
        if capacity == 0 {
            return Err(ConfigurationError::invalid_value(
                "batch.capacity",
                "0",
                "batch capacity must be greater than 0",
            )
            .into());
        }

        Ok(Self::with_checked_capacity(sink, capacity))
    }

    pub fn with_default_capacity(sink: &'a S) -> Self {
        Self::with_checked_capacity(sink, DEFAULT_BATCH_CAPACITY)
    }

    /// `capacity` must be non-zero
    fn with_checked_capacity(sink: &'a S, capacity: usize) -> Self {
        Self {
            sink,
            capacity,
            state: DispatcherState::Accumulating,
            current: Batch::with_capacity(1, capacity),
            batches_flushed: 0,
            items_flushed: 0,
        }
    }

    pub fn state(&self) -> DispatcherState {
        self.state
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Items waiting in the current, not yet flushed batch
    pub fn pending_items(&self) -> usize {
        self.current.len()
    }

    pub fn report(&self) -> DispatchReport {
        DispatchReport {
            batches_flushed: self.batches_flushed,
            items_flushed: self.items_flushed,
        }
    }

    /// Append an item, flushing when the batch reaches capacity
    pub async fn push(&mut self, item: Item) -> EnqueueResult<()> {
        if self.state.is_terminal() {
            return Err(EnqueueError::DispatcherClosed);
        }

        self.current.push(item);

        if self.current.len() >= self.capacity {
            self.flush().await?;
        }
        Ok(())
    }

    /// Flush the trailing partial batch, if any, and move to Done
    pub async fn finish(&mut self) -> EnqueueResult<DispatchReport> {
        if self.state.is_terminal() {
            return Err(EnqueueError::DispatcherClosed);
        }

        if !self.current.is_empty() {
            self.flush().await?;
        }

        self.state = DispatcherState::Done;
        debug!(
            batches_flushed = self.batches_flushed,
            items_flushed = self.items_flushed,
            "Dispatcher finished"
        );
        Ok(self.report())
    }

    /// Drain a line reader through the dispatcher
    pub async fn dispatch_reader<R>(
        &mut self,
        reader: &mut LineReader<R>,
    ) -> EnqueueResult<DispatchReport>
    where
        R: AsyncBufRead + Unpin,
    {
        while let Some(item) = reader.next_item().await? {
            self.push(item).await?;
        }
        self.finish().await
    }

    /// Drain a stream of items through the dispatcher
    pub async fn dispatch_stream<St>(&mut self, items: St) -> EnqueueResult<DispatchReport>
    where
        St: Stream<Item = EnqueueResult<Item>>,
    {
        let mut items = std::pin::pin!(items);
        while let Some(item) = items.try_next().await? {
            self.push(item).await?;
        }
        self.finish().await
    }

    async fn flush(&mut self) -> EnqueueResult<()> {
        self.state = DispatcherState::Flushing;

        let next = Batch::with_capacity(self.current.number() + 1, self.capacity);
        let batch = std::mem::replace(&mut self.current, next);
        let batch_number = batch.number();
        let item_count = batch.len();

        match self.sink.enqueue(batch).await {
            Ok(()) => {
                self.batches_flushed += 1;
                self.items_flushed += item_count as u64;
                self.state = DispatcherState::Accumulating;

                crate::logging::log_batch_operation(
                    "flush",
                    &self.sink.describe(),
                    batch_number,
                    item_count,
                    self.items_flushed,
                    "ok",
                );
                Ok(())
            }
            Err(source) => {
                self.state = DispatcherState::Done;

                error!(
                    sink = %self.sink.describe(),
                    batch_number,
                    item_count,
                    items_flushed = self.items_flushed,
                    error = %source,
                    "Sink rejected batch"
                );

                Err(EnqueueError::SinkFailure {
                    sink: self.sink.describe(),
                    batch_number,
                    item_count,
                    batches_flushed: self.batches_flushed,
                    items_flushed: self.items_flushed,
                    source,
                })
            }
        }
    }
}

impl<S: Sink + ?Sized> fmt::Debug for Dispatcher<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("sink", &self.sink.describe())
            .field("capacity", &self.capacity)
            .field("state", &self.state)
            .field("pending_items", &self.current.len())
            .field("batches_flushed", &self.batches_flushed)
            .field("items_flushed", &self.items_flushed)
            .finish()
    }
}
