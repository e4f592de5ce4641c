#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Tracker Enqueue
//!
//! Batched ingestion of newline-delimited item names into a named work
//! queue.
//!
//! ## Overview
//!
//! Items are read one line at a time, trimmed, and blank lines dropped. The
//! dispatcher groups them into fixed-capacity batches (10,000 by default) and
//! hands each finalized batch to a sink, awaiting it before reading on. The
//! sink is resolved once from a queue identifier (slug) and environment
//! before any input is consumed.
//!
//! ## Module Organization
//!
//! - [`reader`] - Line reader producing trimmed, non-blank items
//! - [`dispatcher`] - Batch state machine and flush accounting
//! - [`sink`] - Sink trait plus pgmq, dry-run and in-memory sinks
//! - [`resolver`] - Queue identifier + environment to sink resolution
//! - [`runner`] - One end-to-end invocation
//! - [`config`] - Environment-aware configuration loading
//! - [`logging`] - Structured logging setup
//! - [`error`] - Error taxonomy
//!
//! ## Quick Start
//!
//! ```rust
//! use tracker_enqueue::{Dispatcher, LineReader, MemorySink};
//!
//! # async fn example() -> Result<(), tracker_enqueue::EnqueueError> {
//! let sink = MemorySink::new();
//! let mut reader = LineReader::new(&b"a\nb\n\nc\n"[..]);
//! let mut dispatcher = Dispatcher::new(&sink, 2)?;
//!
//! let report = dispatcher.dispatch_reader(&mut reader).await?;
//! assert_eq!(report.batches_flushed, 2);
//! assert_eq!(sink.batch_contents(), vec![vec!["a", "b"], vec!["c"]]);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod reader;
pub mod resolver;
pub mod runner;
pub mod sink;
pub mod types;

pub use cli::Cli;
pub use config::{ConfigLoader, ConfigurationError, EnqueueConfig, SinkKind};
pub use dispatcher::{DispatchReport, Dispatcher, DispatcherState};
pub use error::{EnqueueError, EnqueueResult};
pub use reader::LineReader;
pub use resolver::{QueueResolver, SinkResolver};
pub use runner::{run_enqueue, EnqueueRequest, RunSummary};
pub use sink::{DryRunSink, MemorySink, PgmqSink, Sink, SinkError, SinkResult};
pub use types::{Batch, Item};
