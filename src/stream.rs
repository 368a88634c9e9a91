//! Streamed query responses

use crate::error::Result;
use crate::http::ResponseStream;
use crate::parser::{self, FrameOutcome};
use crate::types::{ContextField, QueryOutcome, StreamEvent};
use futures::{Stream, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Buffer management for line-based streaming protocols
///
/// Buffers raw bytes rather than text so a multi-byte character split across
/// two read chunks survives intact; lines are only decoded once
/// newline-terminated.
pub struct LineBuffer {
    buffer: Vec<u8>,
}

impl LineBuffer {
    /// Create a new line buffer
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Add a chunk of bytes and return the complete lines it finished
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line = String::from_utf8_lossy(&self.buffer[..pos]).into_owned();
            lines.push(line);
            self.buffer.drain(..=pos);
        }

        lines
    }

    /// Take any trailing data that never saw a newline
    pub fn take_remainder(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            None
        } else {
            let rest = std::mem::take(&mut self.buffer);
            Some(String::from_utf8_lossy(&rest).into_owned())
        }
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Consumer phase; `Done` is terminal and frames after it are never processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AwaitingData,
    Accumulating,
    Done,
}

/// A streamed query response
///
/// Yields [`StreamEvent`]s decoded from `data:`-prefixed frames until the
/// `[DONE]` sentinel or end of stream. Malformed frames are skipped and
/// counted, never escalated.
pub struct QueryStream {
    inner: ResponseStream,
    buffer: LineBuffer,
    lines: VecDeque<String>,
    phase: Phase,
    eof: bool,
    skipped_frames: u64,
}

impl QueryStream {
    /// Create a stream consumer over a response byte stream
    pub fn new(inner: ResponseStream) -> Self {
        Self {
            inner,
            buffer: LineBuffer::new(),
            lines: VecDeque::new(),
            phase: Phase::AwaitingData,
            eof: false,
            skipped_frames: 0,
        }
    }

    /// Number of malformed frames skipped so far
    pub fn skipped_frames(&self) -> u64 {
        self.skipped_frames
    }

    /// Drain the stream and assemble the final outcome, echoing the given
    /// context metadata
    pub async fn collect_outcome(mut self, metadata: Vec<ContextField>) -> Result<QueryOutcome> {
        let mut outcome = QueryOutcome::new(metadata);

        while let Some(event) = self.next().await {
            match event? {
                StreamEvent::Done => break,
                event => outcome.process_event(event),
            }
        }

        outcome.set_skipped_frames(self.skipped_frames);
        Ok(outcome)
    }
}

impl Stream for QueryStream {
    type Item = Result<StreamEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if this.phase == Phase::Done {
                return Poll::Ready(None);
            }

            // Drain buffered complete lines before reading more bytes
            while let Some(line) = this.lines.pop_front() {
                match parser::parse_line(&line) {
                    None | Some(FrameOutcome::Ignored) => continue,
                    Some(FrameOutcome::Malformed) => {
                        this.skipped_frames += 1;
                        tracing::debug!(
                            total = this.skipped_frames,
                            "skipping malformed event frame"
                        );
                    }
                    Some(FrameOutcome::Done) => {
                        this.phase = Phase::Done;
                        return Poll::Ready(Some(Ok(StreamEvent::Done)));
                    }
                    Some(FrameOutcome::Event(event)) => return Poll::Ready(Some(Ok(event))),
                }
            }

            if this.eof {
                this.phase = Phase::Done;
                return Poll::Ready(None);
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    if this.phase == Phase::AwaitingData {
                        this.phase = Phase::Accumulating;
                    }
                    this.lines.extend(this.buffer.push(&chunk));
                }
                Poll::Ready(Some(Err(e))) => return Poll::Ready(Some(Err(e))),
                Poll::Ready(None) => {
                    this.eof = true;
                    // A trailing line without a newline still counts as a frame
                    if let Some(rest) = this.buffer.take_remainder() {
                        this.lines.push_back(rest);
                    }
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
