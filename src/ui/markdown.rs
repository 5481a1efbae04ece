//! Incremental rendering of the Markdown subset used in replies.
//!
//! Replies arrive one complete line at a time. Each line goes through a small
//! token state machine for `**bold**` spans, and is then checked as a whole for
//! a code fence. The two passes are independent: a fence line may also carry
//! bold text.

use crate::core::constants::{BOLD_MARKER, FENCE_MARKER};
use crate::ui::buffer::{BufferError, DisplayBuffer, StyleTag, WritableScope};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),
    BoldMarker,
}

/// Splits a line into text runs and `**` markers, left to right.
pub fn tokenize(line: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = line;
    while let Some(pos) = rest.find(BOLD_MARKER) {
        if pos > 0 {
            tokens.push(Token::Text(&rest[..pos]));
        }
        tokens.push(Token::BoldMarker);
        rest = &rest[pos + BOLD_MARKER.len()..];
    }
    if !rest.is_empty() {
        tokens.push(Token::Text(rest));
    }
    tokens
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FenceEvent {
    Opened,
    Closed,
}

/// What rendering one line did to the buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LineReport {
    pub bold_spans: usize,
    pub fence: Option<FenceEvent>,
}

/// Renderer state carried from line to line within one reply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MarkdownCursor {
    pub inside_code_block: bool,
    /// Offset of the opening fence line while a block is open.
    pub block_start: usize,
}

enum BoldState {
    Plain,
    Open { start: usize, inner: String },
}

#[derive(Debug, Default)]
pub struct MarkdownRenderer {
    cursor: MarkdownCursor,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> MarkdownCursor {
        self.cursor
    }

    pub fn inside_code_block(&self) -> bool {
        self.cursor.inside_code_block
    }

    /// Forgets any open block; called when a new reply starts.
    pub fn reset(&mut self) {
        self.cursor = MarkdownCursor::default();
    }

    /// Appends `line` to `buffer` with bold and code styling applied.
    pub fn render_line<B>(&mut self, buffer: &mut B, line: &str) -> Result<LineReport, BufferError>
    where
        B: DisplayBuffer + ?Sized,
    {
        let mut buffer = WritableScope::new(buffer);
        let line_start = buffer.end();
        let mut report = LineReport::default();

        let mut state = BoldState::Plain;
        for token in tokenize(line) {
            state = match (state, token) {
                (BoldState::Plain, Token::Text(text)) => {
                    buffer.insert(text)?;
                    BoldState::Plain
                }
                (BoldState::Plain, Token::BoldMarker) => BoldState::Open {
                    start: buffer.end(),
                    inner: String::new(),
                },
                (BoldState::Open { start, mut inner }, Token::Text(text)) => {
                    inner.push_str(text);
                    BoldState::Open { start, inner }
                }
                (BoldState::Open { start, inner }, Token::BoldMarker) => {
                    buffer.insert(&inner)?;
                    let end = buffer.end();
                    buffer.apply_style(StyleTag::Bold, start..end)?;
                    report.bold_spans += 1;
                    BoldState::Plain
                }
            };
        }
        if let BoldState::Open { inner, .. } = state {
            buffer.insert(BOLD_MARKER)?;
            buffer.insert(&inner)?;
        }

        if line.contains(FENCE_MARKER) {
            if self.cursor.inside_code_block {
                let end = buffer.end();
                buffer.apply_style(StyleTag::Code, self.cursor.block_start..end)?;
                self.cursor.inside_code_block = false;
                report.fence = Some(FenceEvent::Closed);
            } else {
                buffer.insert("\n")?;
                self.cursor = MarkdownCursor {
                    inside_code_block: true,
                    block_start: line_start,
                };
                report.fence = Some(FenceEvent::Opened);
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::buffer::StyledBuffer;

    fn render_all(lines: &[&str]) -> (MarkdownRenderer, StyledBuffer) {
        let mut renderer = MarkdownRenderer::new();
        let mut buffer = StyledBuffer::new();
        for line in lines {
            renderer.render_line(&mut buffer, line).expect("render");
        }
        (renderer, buffer)
    }

    #[test]
    fn tokenize_splits_markers_and_text() {
        assert_eq!(
            tokenize("a **b** c"),
            vec![
                Token::Text("a "),
                Token::BoldMarker,
                Token::Text("b"),
                Token::BoldMarker,
                Token::Text(" c"),
            ]
        );
        assert_eq!(
            tokenize("***x**"),
            vec![
                Token::BoldMarker,
                Token::Text("*x"),
                Token::BoldMarker
            ]
        );
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn plain_lines_are_inserted_verbatim() {
        let (_, buffer) = render_all(&["  spaced   out \n", "second\n"]);
        assert_eq!(buffer.text(), "  spaced   out \nsecond\n");
        assert_eq!(buffer.tag_ranges(StyleTag::Bold).count(), 0);
        assert!(!buffer.is_editable());
    }

    #[test]
    fn balanced_pairs_become_bold_spans_without_delimiters() {
        let mut renderer = MarkdownRenderer::new();
        let mut buffer = StyledBuffer::new();
        let report = renderer
            .render_line(&mut buffer, "**Note:** use **care** and **speed**.\n")
            .expect("render");

        assert_eq!(report.bold_spans, 3);
        assert_eq!(buffer.text(), "Note: use care and speed.\n");
        assert!(!buffer.text().contains('*'));
        assert_eq!(buffer.tagged_text(StyleTag::Bold), vec!["Note:", "care", "speed"]);
    }

    #[test]
    fn unmatched_marker_stays_literal() {
        let mut renderer = MarkdownRenderer::new();
        let mut buffer = StyledBuffer::new();
        let report = renderer
            .render_line(&mut buffer, "**one** and **dangling\n")
            .expect("render");

        assert_eq!(report.bold_spans, 1);
        assert_eq!(buffer.text(), "one and **dangling\n");
        assert_eq!(buffer.tagged_text(StyleTag::Bold), vec!["one"]);
    }

    #[test]
    fn fence_opens_with_line_break_and_close_styles_block() {
        let mut renderer = MarkdownRenderer::new();
        let mut buffer = StyledBuffer::new();
        renderer.render_line(&mut buffer, "Example:\n").expect("render");

        let open = renderer.render_line(&mut buffer, "```rust\n").expect("render");
        assert_eq!(open.fence, Some(FenceEvent::Opened));
        assert!(renderer.inside_code_block());
        assert_eq!(renderer.cursor().block_start, "Example:\n".len());

        renderer.render_line(&mut buffer, "let x = 1;\n").expect("render");
        let close = renderer.render_line(&mut buffer, "```\n").expect("render");
        assert_eq!(close.fence, Some(FenceEvent::Closed));
        assert!(!renderer.inside_code_block());

        assert_eq!(buffer.text(), "Example:\n```rust\n\nlet x = 1;\n```\n");
        assert_eq!(
            buffer.tagged_text(StyleTag::Code),
            vec!["```rust\n\nlet x = 1;\n```\n"]
        );
    }

    #[test]
    fn odd_fence_count_leaves_block_open() {
        let (renderer, buffer) = render_all(&["```\n", "a\n", "```\n", "```python\n", "b\n"]);
        assert!(renderer.inside_code_block());
        assert_eq!(buffer.tag_ranges(StyleTag::Code).count(), 1);
    }

    #[test]
    fn bold_is_applied_independently_on_fence_lines() {
        let (renderer, buffer) = render_all(&["**Code** ```\n"]);
        assert!(renderer.inside_code_block());
        assert_eq!(buffer.tagged_text(StyleTag::Bold), vec!["Code"]);
        assert_eq!(buffer.text(), "Code ```\n\n");
    }

    #[test]
    fn reset_forgets_open_block() {
        let (mut renderer, _) = render_all(&["```\n"]);
        renderer.reset();
        assert_eq!(renderer.cursor(), MarkdownCursor::default());
    }

    #[test]
    fn empty_pair_counts_but_inserts_nothing() {
        let mut renderer = MarkdownRenderer::new();
        let mut buffer = StyledBuffer::new();
        let report = renderer.render_line(&mut buffer, "a****b\n").expect("render");
        assert_eq!(report.bold_spans, 1);
        assert_eq!(buffer.text(), "ab\n");
        assert!(buffer.tagged_text(StyleTag::Bold).is_empty());
    }
}
