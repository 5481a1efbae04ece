use std::error::Error as StdError;
use std::fmt;

use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use memchr::memchr;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::ChatRequest;
use crate::core::decoder::{parse_frame, Frame, StreamDecoder};
use crate::core::render_queue::{render_queue, RenderDrain, RenderMessage, RenderQueue};

/// Errors that end a stream before or while the body is read.
#[derive(Debug)]
pub enum TransportError {
    /// The request could not be sent (DNS, connect, TLS, ...).
    Request(reqwest::Error),
    /// The endpoint answered with a non-success status.
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    /// The connection failed while the body was streaming.
    Body(reqwest::Error),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Request(source) => write!(f, "Request failed: {source}"),
            TransportError::Status { status, body } => {
                write!(f, "HTTP {status}: {}", format_api_error(body))
            }
            TransportError::Body(source) => write!(f, "Stream interrupted: {source}"),
        }
    }
}

impl StdError for TransportError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            TransportError::Request(source) | TransportError::Body(source) => Some(source),
            TransportError::Status { .. } => None,
        }
    }
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value.get("error").and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.to_string()),
                _ => None,
            })
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary.map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn format_api_error(error_text: &str) -> String {
    let trimmed = error_text.trim();

    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    if let Ok(json_value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Ok(pretty_json) = serde_json::to_string_pretty(&json_value) {
            return match extract_error_summary(&json_value).filter(|s| !s.is_empty()) {
                Some(summary) => format!("{summary}\n```json\n{pretty_json}\n```"),
                None => format!("\n```json\n{pretty_json}\n```"),
            };
        }
    }

    if trimmed.starts_with('<') && trimmed.ends_with('>') {
        format!("\n```xml\n{trimmed}\n```")
    } else {
        format!("\n```\n{trimmed}\n```")
    }
}

/// Raw lines of a response body, read lazily.
///
/// The stream owns the underlying connection; dropping it releases the
/// socket no matter how the consuming loop ended.
pub struct LineStream {
    chunks: BoxStream<'static, Result<Vec<u8>, TransportError>>,
    buffer: Vec<u8>,
    finished: bool,
}

impl LineStream {
    pub fn new(chunks: BoxStream<'static, Result<Vec<u8>, TransportError>>) -> Self {
        Self {
            chunks,
            buffer: Vec::new(),
            finished: false,
        }
    }

    fn from_response(response: reqwest::Response) -> Self {
        let chunks = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(TransportError::Body))
            .boxed();
        Self::new(chunks)
    }

    /// Next complete line without its terminator. A final unterminated line
    /// is yielded once the body ends.
    pub async fn next_line(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            if let Some(newline_pos) = memchr(b'\n', &self.buffer) {
                let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
                return Some(Ok(decode_line(&line[..newline_pos])));
            }

            if self.finished {
                if self.buffer.is_empty() {
                    return None;
                }
                let line = std::mem::take(&mut self.buffer);
                return Some(Ok(decode_line(&line)));
            }

            match self.chunks.next().await {
                Some(Ok(bytes)) => self.buffer.extend_from_slice(&bytes),
                Some(Err(err)) => return Some(Err(err)),
                None => self.finished = true,
            }
        }
    }
}

fn decode_line(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(line) => line.to_string(),
        Err(err) => {
            debug!(error = %err, "Invalid UTF-8 in stream");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

/// Opens streaming completions against one endpoint with one credential.
#[derive(Clone)]
pub struct TransportClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl TransportClient {
    pub fn new(client: reqwest::Client, endpoint: String, api_key: String) -> Self {
        Self {
            client,
            endpoint,
            api_key,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn open(&self, request: &ChatRequest) -> Result<LineStream, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(request)
            .send()
            .await
            .map_err(TransportError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(TransportError::Status { status, body });
        }

        Ok(LineStream::from_response(response))
    }
}

/// One question/answer exchange as seen by the worker.
///
/// The session is active until its token is cancelled; clones share the
/// same flag.
#[derive(Clone, Debug)]
pub struct StreamSession {
    pub query: String,
    pub stream_id: u64,
    cancel_token: CancellationToken,
}

impl StreamSession {
    pub fn new(query: String, stream_id: u64) -> Self {
        Self {
            query,
            stream_id,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.cancel_token.is_cancelled()
    }

    pub fn deactivate(&self) {
        self.cancel_token.cancel();
    }
}

pub struct StreamParams {
    pub request: ChatRequest,
    pub session: StreamSession,
}

/// Consumes `lines` for `session`, pushing chunks and exactly one
/// terminating message to `queue`.
pub async fn pump_lines(mut lines: LineStream, session: &StreamSession, queue: &RenderQueue) {
    let stream_id = session.stream_id;
    let mut decoder = StreamDecoder::new();

    loop {
        if !session.is_active() {
            debug!(stream_id, "Stream cancelled; stopping decode loop");
            break;
        }

        let line = match lines.next_line().await {
            Some(Ok(line)) => line,
            Some(Err(err)) => {
                debug!(stream_id, error = %err, "Stream failed mid-body");
                queue.push(stream_id, RenderMessage::Error(err.to_string()));
                return;
            }
            None => break,
        };

        match parse_frame(&line) {
            Frame::Done => break,
            Frame::Skip => {}
            Frame::Content(content) => {
                for complete in decoder.push_content(&content) {
                    queue.push(stream_id, RenderMessage::Chunk(complete));
                }
            }
        }
    }

    let full_reply = decoder.finish();
    debug!(stream_id, reply_len = full_reply.len(), "Stream complete");
    queue.push(stream_id, RenderMessage::Complete(full_reply));
}

/// Runs one session end to end: opens the transport and pumps its lines.
pub async fn run_stream(transport: &TransportClient, params: StreamParams, queue: &RenderQueue) {
    let StreamParams { request, session } = params;

    match transport.open(&request).await {
        Ok(lines) => pump_lines(lines, &session, queue).await,
        Err(err) => {
            debug!(stream_id = session.stream_id, error = %err, "Stream request failed");
            queue.push(session.stream_id, RenderMessage::Error(err.to_string()));
        }
    }
}

#[derive(Clone)]
pub struct ChatStreamService {
    transport: TransportClient,
    queue: RenderQueue,
}

impl ChatStreamService {
    pub fn new(transport: TransportClient) -> (Self, RenderDrain) {
        let (queue, drain) = render_queue();
        (Self { transport, queue }, drain)
    }

    pub fn spawn_stream(&self, params: StreamParams) -> tokio::task::JoinHandle<()> {
        let transport = self.transport.clone();
        let queue = self.queue.clone();
        debug!(
            stream_id = params.session.stream_id,
            endpoint = %transport.endpoint(),
            "Spawning stream worker"
        );
        tokio::spawn(async move {
            run_stream(&transport, params, &queue).await;
        })
    }
}
