//! Lifecycle of one question/answer exchange on the UI side.
//!
//! The controller moves between `Idle` and `Streaming`. A send hands back the
//! parameters for a worker (the caller decides how to spawn it); the UI loop
//! then calls [`SessionController::drain`] on every tick until the session
//! completes, fails, or is stopped.

use tracing::{debug, warn};

use crate::api::{ChatRequest, DecodingParams};
use crate::core::chat_stream::{StreamParams, StreamSession};
use crate::core::constants::CANCELLED_MARKER;
use crate::core::render_queue::{RenderDrain, RenderMessage};
use crate::core::surface::ChatSurface;
use crate::ui::buffer::{StyleTag, WritableScope};
use crate::ui::markdown::MarkdownRenderer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Streaming,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    Completed,
    Cancelled,
    Failed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RequestTemplate {
    pub model: String,
    pub system_prompt: Option<String>,
    pub params: DecodingParams,
}

impl RequestTemplate {
    pub fn build(&self, query: &str) -> ChatRequest {
        ChatRequest::single_turn(
            &self.model,
            self.system_prompt.as_deref(),
            query,
            &self.params,
        )
    }
}

/// Outcome of one drain tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub drained: usize,
    pub chunks: usize,
    /// Messages from a stream other than the current one.
    pub stale: usize,
    pub ended: Option<SessionEnd>,
}

struct ActiveSession {
    session: StreamSession,
    /// Bytes of the reply already rendered from `Chunk`s.
    rendered_len: usize,
}

pub struct SessionController {
    template: RequestTemplate,
    drain: RenderDrain,
    renderer: MarkdownRenderer,
    current: Option<ActiveSession>,
    next_stream_id: u64,
}

fn append<S: ChatSurface + ?Sized>(surface: &mut S, text: &str, tag: Option<StyleTag>) {
    let mut buffer = WritableScope::new(surface.transcript());
    let start = buffer.end();
    let result = buffer.insert(text).and_then(|()| match tag {
        Some(tag) => {
            let end = buffer.end();
            buffer.apply_style(tag, start..end)
        }
        None => Ok(()),
    });
    if let Err(err) = result {
        warn!(error = %err, "Failed to append to transcript");
    }
}

impl SessionController {
    pub fn new(template: RequestTemplate, drain: RenderDrain) -> Self {
        Self {
            template,
            drain,
            renderer: MarkdownRenderer::new(),
            current: None,
            next_stream_id: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.current.is_some() {
            SessionState::Streaming
        } else {
            SessionState::Idle
        }
    }

    /// Starts a session for the current input. Returns `None` (and leaves
    /// everything untouched) for blank input or while a stream is running.
    pub fn send<S: ChatSurface + ?Sized>(&mut self, surface: &mut S) -> Option<StreamParams> {
        if self.current.is_some() {
            debug!("Send ignored while a stream is active");
            return None;
        }

        let query = surface.input_text();
        if query.trim().is_empty() {
            return None;
        }

        self.next_stream_id += 1;
        let session = StreamSession::new(query.clone(), self.next_stream_id);
        self.renderer.reset();

        surface.set_input_enabled(false);
        surface.set_send_enabled(false);
        surface.set_stop_enabled(true);
        surface.set_busy(true);
        append(
            surface,
            &format!("You: {}\n", query.trim_end()),
            Some(StyleTag::Prompt),
        );

        debug!(stream_id = session.stream_id, query_len = query.len(), "Session started");
        self.current = Some(ActiveSession {
            session: session.clone(),
            rendered_len: 0,
        });

        Some(StreamParams {
            request: self.template.build(&query),
            session,
        })
    }

    /// Cancels the running session. Returns `false` when idle.
    pub fn stop<S: ChatSurface + ?Sized>(&mut self, surface: &mut S) -> bool {
        let Some(active) = self.current.as_ref() else {
            return false;
        };
        active.session.deactivate();
        let discarded = self.drain.discard_pending();
        debug!(
            stream_id = active.session.stream_id,
            discarded, "Session cancelled by user"
        );

        append(surface, &format!("\n{CANCELLED_MARKER}\n"), Some(StyleTag::Notice));
        self.finish(surface, SessionEnd::Cancelled);
        true
    }

    /// Deactivates any running session without touching the UI.
    pub fn shutdown(&mut self) {
        if let Some(active) = self.current.take() {
            active.session.deactivate();
        }
    }

    /// Processes every message currently queued, without waiting for more.
    pub fn drain<S: ChatSurface + ?Sized>(&mut self, surface: &mut S) -> DrainReport {
        let mut report = DrainReport::default();

        while let Some((message, stream_id)) = self.drain.try_next() {
            report.drained += 1;

            let is_current = self
                .current
                .as_ref()
                .is_some_and(|active| active.session.stream_id == stream_id);
            if !is_current {
                report.stale += 1;
                continue;
            }

            match message {
                RenderMessage::Chunk(line) => {
                    if let Some(active) = self.current.as_mut() {
                        active.rendered_len += line.len();
                    }
                    if let Err(err) = self.renderer.render_line(surface.transcript(), &line) {
                        warn!(error = %err, "Failed to render reply line");
                    }
                    report.chunks += 1;
                }
                RenderMessage::Complete(full_reply) => {
                    self.render_tail(surface, &full_reply);
                    self.finish(surface, SessionEnd::Completed);
                    report.ended = Some(SessionEnd::Completed);
                    break;
                }
                RenderMessage::Error(message) => {
                    append(surface, &format!("\nError: {message}\n"), Some(StyleTag::Error));
                    self.finish(surface, SessionEnd::Failed);
                    report.ended = Some(SessionEnd::Failed);
                }
            }
        }

        report
    }

    /// Renders the part of the reply after its last newline, which never
    /// arrives as a chunk.
    fn render_tail<S: ChatSurface + ?Sized>(&mut self, surface: &mut S, full_reply: &str) {
        let rendered_len = self
            .current
            .as_ref()
            .map_or(0, |active| active.rendered_len);
        let Some(tail) = full_reply.get(rendered_len..).filter(|t| !t.is_empty()) else {
            return;
        };
        let line = format!("{tail}\n");
        if let Err(err) = self.renderer.render_line(surface.transcript(), &line) {
            warn!(error = %err, "Failed to render reply tail");
        }
    }

    fn finish<S: ChatSurface + ?Sized>(&mut self, surface: &mut S, end: SessionEnd) {
        if let Some(active) = self.current.take() {
            debug!(stream_id = active.session.stream_id, ?end, "Session finished");
        }
        if self.renderer.inside_code_block() {
            debug!("Reply left a code block open");
        }

        append(surface, "\n", None);
        surface.set_busy(false);
        surface.set_stop_enabled(false);
        surface.set_send_enabled(true);
        surface.set_input_enabled(true);
        surface.clear_input();
    }
}
