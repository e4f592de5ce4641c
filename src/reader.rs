//! # Line Reader
//!
//! Turns a buffered byte stream into a lazy, single-pass sequence of
//! [`Item`]s. One line buffer is reused for the whole stream, so memory stays
//! proportional to the longest line.

use crate::error::{EnqueueError, EnqueueResult};
use crate::types::Item;
use futures::Stream;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::trace;

#[derive(Debug)]
pub struct LineReader<R> {
    inner: R,
    buffer: Vec<u8>,
    lines_read: u64,
    blank_lines: u64,
    exhausted: bool,
}

impl<R> LineReader<R>
where
    R: AsyncBufRead + Unpin,
{
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            lines_read: 0,
            blank_lines: 0,
            exhausted: false,
        }
    }

    /// Next non-blank item, or `None` at end of stream.
    ///
    /// Read failures and invalid UTF-8 are fatal and carry the 1-based line
    /// number that was being read.
    pub async fn next_item(&mut self) -> EnqueueResult<Option<Item>> {
        if self.exhausted {
            return Ok(None);
        }

        loop {
            self.buffer.clear();
            let line_number = self.lines_read + 1;

            let bytes = self
                .inner
                .read_until(b'\n', &mut self.buffer)
                .await
                .map_err(|source| EnqueueError::input_read(line_number, source))?;

            if bytes == 0 {
                self.exhausted = true;
                trace!(lines_read = self.lines_read, "Input exhausted");
                return Ok(None);
            }

            self.lines_read = line_number;

            let line = std::str::from_utf8(&self.buffer).map_err(|e| {
                EnqueueError::input_read(
                    line_number,
                    std::io::Error::new(std::io::ErrorKind::InvalidData, e),
                )
            })?;

            match Item::from_line(line) {
                Some(item) => return Ok(Some(item)),
                None => self.blank_lines += 1,
            }
        }
    }

    /// Lines consumed so far, blank ones included
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    pub fn blank_lines(&self) -> u64 {
        self.blank_lines
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Adapt the reader into a stream of items
    pub fn into_stream(self) -> impl Stream<Item = EnqueueResult<Item>> {
        futures::stream::try_unfold(self, |mut reader| async move {
            let next = reader.next_item().await?;
            Ok::<_, EnqueueError>(next.map(|item| (item, reader)))
        })
    }
}
