//! Dry-run sink: prints each batch as one JSON line instead of enqueueing.

use super::{Sink, SinkResult};
use crate::constants::sinks;
use crate::types::{Batch, Item};
use async_trait::async_trait;
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Serialize)]
struct DryRunRecord<'a> {
    queue: &'a str,
    batch_number: u64,
    item_count: usize,
    items: &'a [Item],
}

#[derive(Debug)]
pub struct DryRunSink<W> {
    queue_name: String,
    writer: Mutex<W>,
}

impl DryRunSink<Stdout> {
    pub fn stdout(queue_name: impl Into<String>) -> Self {
        Self::new(queue_name, tokio::io::stdout())
    }
}

impl<W> DryRunSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(queue_name: impl Into<String>, writer: W) -> Self {
        Self {
            queue_name: queue_name.into(),
            writer: Mutex::new(writer),
        }
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W> Sink for DryRunSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    fn describe(&self) -> String {
        format!("{}:{}", sinks::DRY_RUN, self.queue_name)
    }

    async fn enqueue(&self, batch: Batch) -> SinkResult<()> {
        let record = DryRunRecord {
            queue: &self.queue_name,
            batch_number: batch.number(),
            item_count: batch.len(),
            items: batch.items(),
        };
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;

        debug!(
            queue = %self.queue_name,
            batch_number = batch.number(),
            item_count = batch.len(),
            "Dry run: batch written to output"
        );
        Ok(())
    }
}
