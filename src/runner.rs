//! One enqueue invocation: resolve the sink, stream the input through the
//! dispatcher, summarize.

use crate::dispatcher::Dispatcher;
use crate::error::EnqueueResult;
use crate::reader::LineReader;
use crate::resolver::SinkResolver;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tokio::io::AsyncBufRead;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnqueueRequest {
    pub queue_identifier: String,
    pub environment: String,
    pub batch_capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub queue_identifier: String,
    pub environment: String,
    pub sink: String,
    pub batches_enqueued: u64,
    pub items_enqueued: u64,
    pub lines_read: u64,
    pub blank_lines: u64,
    pub elapsed_ms: u64,
}

/// Resolve the queue, then drain `input` into it.
///
/// Resolution failures surface before a single byte of input is read. Any
/// later failure leaves earlier batches enqueued.
pub async fn run_enqueue<Res, R>(
    resolver: &Res,
    request: &EnqueueRequest,
    input: R,
) -> EnqueueResult<RunSummary>
where
    Res: SinkResolver + ?Sized,
    R: AsyncBufRead + Unpin,
{
    let started = Instant::now();

    let sink = resolver
        .resolve(&request.queue_identifier, &request.environment)
        .await?;
    let sink_description = sink.describe();

    info!(
        queue_identifier = %request.queue_identifier,
        environment = %request.environment,
        sink = %sink_description,
        batch_capacity = request.batch_capacity,
        "Enqueue started"
    );

    let mut reader = LineReader::new(input);
    let mut dispatcher = Dispatcher::new(sink.as_ref(), request.batch_capacity)?;

    let report = match dispatcher.dispatch_reader(&mut reader).await {
        Ok(report) => report,
        Err(e) => {
            let flushed = dispatcher.report();
            warn!(
                lines_read = reader.lines_read(),
                batches_enqueued = flushed.batches_flushed,
                items_enqueued = flushed.items_flushed,
                "Enqueue aborted; earlier batches remain enqueued"
            );
            return Err(e);
        }
    };

    let summary = RunSummary {
        queue_identifier: request.queue_identifier.clone(),
        environment: request.environment.clone(),
        sink: sink_description,
        batches_enqueued: report.batches_flushed,
        items_enqueued: report.items_flushed,
        lines_read: reader.lines_read(),
        blank_lines: reader.blank_lines(),
        elapsed_ms: started.elapsed().as_millis() as u64,
    };

    info!(
        batches_enqueued = summary.batches_enqueued,
        items_enqueued = summary.items_enqueued,
        lines_read = summary.lines_read,
        blank_lines = summary.blank_lines,
        elapsed_ms = summary.elapsed_ms,
        "✅ Enqueue complete"
    );

    Ok(summary)
}
