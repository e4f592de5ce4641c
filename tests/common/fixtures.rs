use async_trait::async_trait;
use parking_lot::Mutex;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};
use tracker_enqueue::types::is_line_padding;
use tracker_enqueue::{
    Batch, EnqueueError, EnqueueResult, MemorySink, Sink, SinkResolver, SinkResult,
};

/// Reference model: the trimmed, non-blank lines of `input` in order
pub fn expected_items(input: &str) -> Vec<String> {
    input
        .split('\n')
        .map(|line| line.trim_matches(is_line_padding))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Input of `count` distinct item lines
pub fn numbered_lines(count: usize) -> String {
    (1..=count).map(|n| format!("item{n}\n")).collect()
}

/// Sink handle that can be returned from a resolver and still inspected
#[derive(Debug, Clone)]
pub struct SharedSink(pub Arc<MemorySink>);

#[async_trait]
impl Sink for SharedSink {
    fn describe(&self) -> String {
        self.0.describe()
    }

    async fn enqueue(&self, batch: Batch) -> SinkResult<()> {
        self.0.enqueue(batch).await
    }
}

/// Resolver that hands out a shared memory sink and records every call
#[derive(Debug)]
pub struct RecordingResolver {
    pub sink: Arc<MemorySink>,
    pub calls: Mutex<Vec<(String, String)>>,
    pub fail_with: Option<String>,
}

impl RecordingResolver {
    pub fn new(sink: MemorySink) -> Self {
        Self {
            sink: Arc::new(sink),
            calls: Mutex::new(Vec::new()),
            fail_with: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            ..Self::new(MemorySink::new())
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl SinkResolver for RecordingResolver {
    async fn resolve(
        &self,
        queue_identifier: &str,
        environment: &str,
    ) -> EnqueueResult<Box<dyn Sink>> {
        self.calls
            .lock()
            .push((queue_identifier.to_string(), environment.to_string()));

        if let Some(reason) = &self.fail_with {
            return Err(EnqueueError::resolution(
                queue_identifier,
                environment,
                reason.clone(),
            ));
        }

        Ok(Box::new(SharedSink(Arc::clone(&self.sink))))
    }
}

/// Input that records whether anything polled it for bytes
#[derive(Debug)]
pub struct TrackedInput {
    data: &'static [u8],
    pub touched: Arc<AtomicBool>,
}

impl TrackedInput {
    pub fn new(data: &'static [u8]) -> Self {
        Self {
            data,
            touched: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl AsyncRead for TrackedInput {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        self.touched.store(true, Ordering::SeqCst);
        Pin::new(&mut self.data).poll_read(cx, buf)
    }
}
