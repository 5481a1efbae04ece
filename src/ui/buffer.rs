//! Append-only styled text buffer backing the transcript pane.

use std::error::Error as StdError;
use std::fmt;
use std::ops::{Deref, DerefMut, Range};

/// Named styles that can be laid over a range of the transcript.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleTag {
    Bold,
    Code,
    Prompt,
    Error,
    Notice,
}

#[derive(Debug, PartialEq, Eq)]
pub enum BufferError {
    /// A mutation was attempted while the buffer was read-only.
    ReadOnly,
    /// A style range reached past the end of the text or split a character.
    OutOfBounds { range: Range<usize>, len: usize },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::ReadOnly => write!(f, "display buffer is read-only"),
            BufferError::OutOfBounds { range, len } => write!(
                f,
                "style range {}..{} is outside the buffer (len {len})",
                range.start, range.end
            ),
        }
    }
}

impl StdError for BufferError {}

/// The operations the renderer and session controller need from a display.
pub trait DisplayBuffer {
    fn insert(&mut self, text: &str) -> Result<(), BufferError>;
    /// Current insertion point (byte offset).
    fn end(&self) -> usize;
    fn apply_style(&mut self, tag: StyleTag, range: Range<usize>) -> Result<(), BufferError>;
    fn set_editable(&mut self, editable: bool);
}

/// Makes a buffer writable for as long as the scope lives.
///
/// The buffer goes back to read-only when the scope is dropped, including
/// early returns through `?`.
pub struct WritableScope<'a, B: DisplayBuffer + ?Sized> {
    buffer: &'a mut B,
}

impl<'a, B: DisplayBuffer + ?Sized> WritableScope<'a, B> {
    pub fn new(buffer: &'a mut B) -> Self {
        buffer.set_editable(true);
        Self { buffer }
    }
}

impl<B: DisplayBuffer + ?Sized> Deref for WritableScope<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.buffer
    }
}

impl<B: DisplayBuffer + ?Sized> DerefMut for WritableScope<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.buffer
    }
}

impl<B: DisplayBuffer + ?Sized> Drop for WritableScope<'_, B> {
    fn drop(&mut self) {
        self.buffer.set_editable(false);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub tags: Vec<StyleTag>,
}

/// In-memory [`DisplayBuffer`]: plain text plus tagged byte ranges.
#[derive(Debug, Default)]
pub struct StyledBuffer {
    text: String,
    tags: Vec<(StyleTag, Range<usize>)>,
    editable: bool,
}

impl StyledBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn tag_ranges(&self, tag: StyleTag) -> impl Iterator<Item = &Range<usize>> + '_ {
        self.tags
            .iter()
            .filter(move |(t, _)| *t == tag)
            .map(|(_, range)| range)
    }

    /// The text covered by every non-empty range carrying `tag`.
    pub fn tagged_text(&self, tag: StyleTag) -> Vec<&str> {
        self.tag_ranges(tag)
            .filter(|range| !range.is_empty())
            .map(|range| &self.text[range.clone()])
            .collect()
    }

    /// Splits the buffer into display lines of uniformly styled segments.
    pub fn styled_lines(&self) -> Vec<Vec<Segment>> {
        let mut lines = Vec::new();
        let mut offset = 0;

        for raw_line in self.text.split('\n') {
            let line_start = offset;
            let line_end = line_start + raw_line.len();
            offset = line_end + 1;

            let mut cuts = vec![line_start, line_end];
            for (_, range) in &self.tags {
                for point in [range.start, range.end] {
                    if point > line_start && point < line_end {
                        cuts.push(point);
                    }
                }
            }
            cuts.sort_unstable();
            cuts.dedup();

            let mut segments: Vec<Segment> = Vec::new();
            for window in cuts.windows(2) {
                let (start, end) = (window[0], window[1]);
                if start == end {
                    continue;
                }
                let tags: Vec<StyleTag> = self
                    .tags
                    .iter()
                    .filter(|(_, range)| range.start <= start && end <= range.end)
                    .map(|(tag, _)| *tag)
                    .collect();
                let text = &self.text[start..end];
                match segments.last_mut() {
                    Some(last) if last.tags == tags => last.text.push_str(text),
                    _ => segments.push(Segment {
                        text: text.to_string(),
                        tags,
                    }),
                }
            }
            lines.push(segments);
        }

        // `split` yields one empty trailing line after a final newline.
        if self.text.ends_with('\n') {
            lines.pop();
        }
        lines
    }
}

impl DisplayBuffer for StyledBuffer {
    fn insert(&mut self, text: &str) -> Result<(), BufferError> {
        if !self.editable {
            return Err(BufferError::ReadOnly);
        }
        self.text.push_str(text);
        Ok(())
    }

    fn end(&self) -> usize {
        self.text.len()
    }

    fn apply_style(&mut self, tag: StyleTag, range: Range<usize>) -> Result<(), BufferError> {
        if !self.editable {
            return Err(BufferError::ReadOnly);
        }
        let len = self.text.len();
        if range.start > range.end
            || range.end > len
            || !self.text.is_char_boundary(range.start)
            || !self.text.is_char_boundary(range.end)
        {
            return Err(BufferError::OutOfBounds { range, len });
        }
        if !range.is_empty() {
            self.tags.push((tag, range));
        }
        Ok(())
    }

    fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }
}
