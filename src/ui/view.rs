//! Terminal widgets behind [`ChatSurface`]: the input line, the send/stop
//! controls, the busy indicator and the transcript.

use std::time::Instant;

use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::core::surface::ChatSurface;
use crate::ui::buffer::{DisplayBuffer, StyleTag, StyledBuffer};
use crate::ui::theme::Theme;
use crate::utils::scroll::{prewrap_lines, wrapped_line_count};

pub struct ChatView {
    input: String,
    input_enabled: bool,
    send_enabled: bool,
    stop_enabled: bool,
    busy: bool,
    pub pulse_start: Instant,
    transcript: StyledBuffer,
    pub scroll_offset: u16,
    pub auto_scroll: bool,
}

impl Default for ChatView {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatView {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            input_enabled: true,
            send_enabled: true,
            stop_enabled: false,
            busy: false,
            pulse_start: Instant::now(),
            transcript: StyledBuffer::new(),
            scroll_offset: 0,
            auto_scroll: true,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn can_send(&self) -> bool {
        self.send_enabled
    }

    pub fn can_stop(&self) -> bool {
        self.stop_enabled
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn transcript_buffer(&self) -> &StyledBuffer {
        &self.transcript
    }

    pub fn insert_char(&mut self, c: char) {
        if self.input_enabled && !c.is_control() {
            self.input.push(c);
        }
    }

    pub fn insert_str(&mut self, text: &str) {
        if !self.input_enabled {
            return;
        }
        let sanitized: String = text
            .chars()
            .map(|c| if c == '\n' || c == '\t' { ' ' } else { c })
            .filter(|c| !c.is_control())
            .collect();
        self.input.push_str(&sanitized);
    }

    pub fn backspace(&mut self) {
        if self.input_enabled {
            self.input.pop();
        }
    }

    fn lines_styled_by(&self, style_of: impl Fn(&[StyleTag]) -> Style) -> Vec<Line<'static>> {
        self.transcript
            .styled_lines()
            .into_iter()
            .map(|segments| {
                Line::from(
                    segments
                        .into_iter()
                        .map(|segment| Span::styled(segment.text, style_of(&segment.tags)))
                        .collect::<Vec<_>>(),
                )
            })
            .collect()
    }

    /// Transcript as display lines, styled through `theme`.
    pub fn transcript_lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        self.lines_styled_by(|tags| theme.segment_style(tags))
    }

    /// Transcript rows as drawn in a pane `width` columns wide.
    pub fn wrapped_lines(&self, theme: &Theme, width: u16) -> Vec<Line<'static>> {
        prewrap_lines(&self.transcript_lines(theme), width)
    }

    /// Number of rows the transcript occupies when wrapped at `width`.
    pub fn wrapped_line_count(&self, width: u16) -> u16 {
        wrapped_line_count(&self.lines_styled_by(|_| Style::default()), width)
    }

    pub fn max_scroll_offset(&self, width: u16, height: u16) -> u16 {
        self.wrapped_line_count(width).saturating_sub(height)
    }

    /// The offset to render with, following the tail while auto-scrolling.
    pub fn effective_scroll(&self, width: u16, height: u16) -> u16 {
        self.scroll_for_rows(self.wrapped_line_count(width), height)
    }

    /// [`Self::effective_scroll`] for a transcript already wrapped to `rows`.
    pub fn scroll_for_rows(&self, rows: u16, height: u16) -> u16 {
        let max_offset = rows.saturating_sub(height);
        if self.auto_scroll {
            max_offset
        } else {
            self.scroll_offset.min(max_offset)
        }
    }

    pub fn scroll_up(&mut self, lines: u16, width: u16, height: u16) {
        let current = self.effective_scroll(width, height);
        self.scroll_offset = current.saturating_sub(lines);
        self.auto_scroll = false;
    }

    pub fn scroll_down(&mut self, lines: u16, width: u16, height: u16) {
        let max_offset = self.max_scroll_offset(width, height);
        let next = self.effective_scroll(width, height).saturating_add(lines);
        if next >= max_offset {
            self.scroll_to_bottom();
        } else {
            self.scroll_offset = next;
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
        self.auto_scroll = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.auto_scroll = true;
    }
}

impl ChatSurface for ChatView {
    fn input_text(&self) -> String {
        self.input.clone()
    }

    fn set_input_text(&mut self, text: &str) {
        self.input = text.to_string();
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    fn set_send_enabled(&mut self, enabled: bool) {
        self.send_enabled = enabled;
    }

    fn set_stop_enabled(&mut self, enabled: bool) {
        self.stop_enabled = enabled;
    }

    fn set_busy(&mut self, busy: bool) {
        if busy && !self.busy {
            self.pulse_start = Instant::now();
        }
        self.busy = busy;
    }

    fn transcript(&mut self) -> &mut dyn DisplayBuffer {
        &mut self.transcript
    }
}
