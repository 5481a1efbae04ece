//! Turns SSE lines from the completion endpoint into line-granular reply text.
//!
//! The decoder does no I/O: the worker in
//! [`crate::core::chat_stream`] feeds it raw lines and forwards whatever
//! complete lines come back to the render queue.
//!
//! Malformed frames are dropped. A payload that does not parse as a delta
//! record produces no output and does not end the stream.

use memchr::memchr;
use tracing::debug;

use crate::api::ChatResponse;
use crate::core::constants::{FENCE_MARKER, SSE_DATA_PREFIX, STREAM_SENTINEL};

/// What a single raw line of the event stream amounts to.
#[derive(Debug, PartialEq, Eq)]
pub enum Frame {
    /// A delta carrying reply text.
    Content(String),
    /// The end-of-stream sentinel.
    Done,
    /// Blank lines, comments, non-data fields, empty deltas and malformed
    /// payloads.
    Skip,
}

fn extract_data_payload(line: &str) -> Option<&str> {
    line.strip_prefix(SSE_DATA_PREFIX).map(str::trim_start)
}

/// Classifies one raw line. Trailing `\r`/whitespace is ignored.
pub fn parse_frame(line: &str) -> Frame {
    let Some(payload) = extract_data_payload(line.trim_end()) else {
        return Frame::Skip;
    };

    if payload == STREAM_SENTINEL {
        return Frame::Done;
    }

    match serde_json::from_str::<ChatResponse>(payload) {
        Ok(response) => match response.first_delta_content() {
            Some(content) if !content.is_empty() => Frame::Content(content.to_string()),
            _ => Frame::Skip,
        },
        Err(err) => {
            if !payload.is_empty() {
                debug!(error = %err, payload_len = payload.len(), "Dropping malformed frame");
            }
            Frame::Skip
        }
    }
}

/// Accumulates reply text until a newline completes a line.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: String,
}

impl LineBuffer {
    /// Appends `text` and returns every line it completed, each with its
    /// terminating `\n`. The unterminated tail stays buffered.
    pub fn push(&mut self, text: &str) -> Vec<String> {
        self.pending.push_str(text);

        let mut lines = Vec::new();
        while let Some(newline_pos) = memchr(b'\n', self.pending.as_bytes()) {
            let rest = self.pending.split_off(newline_pos + 1);
            lines.push(std::mem::replace(&mut self.pending, rest));
        }
        lines
    }

    pub fn remainder(&self) -> &str {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct StreamDecoder {
    line_buffer: LineBuffer,
    full_reply: String,
    fence_open: bool,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one delta's text and returns the lines it completed.
    pub fn push_content(&mut self, content: &str) -> Vec<String> {
        self.full_reply.push_str(content);
        let lines = self.line_buffer.push(content);
        for line in &lines {
            if line.starts_with(FENCE_MARKER) {
                self.fence_open = !self.fence_open;
            }
        }
        lines
    }

    pub fn full_reply(&self) -> &str {
        &self.full_reply
    }

    /// Text received after the last newline, not yet emitted as a line.
    pub fn pending_line(&self) -> &str {
        self.line_buffer.remainder()
    }

    /// Whether the lines emitted so far leave a code fence open.
    pub fn in_code_block(&self) -> bool {
        self.fence_open
    }

    /// Ends the session and yields the full reply. The pending partial line
    /// is only reflected in the returned text.
    pub fn finish(self) -> String {
        if self.fence_open {
            debug!("Reply ended inside an unterminated code block");
        }
        self.full_reply
    }
}
