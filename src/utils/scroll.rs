use ratatui::{
    style::Style,
    text::{Line, Span},
};
use unicode_width::UnicodeWidthChar;

/// Collects the styled rows of one logical line as it is wrapped.
struct RowBuilder<'r> {
    width: usize,
    rows: &'r mut Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    used: usize,
    emitted: bool,
}

impl<'r> RowBuilder<'r> {
    fn new(width: usize, rows: &'r mut Vec<Line<'static>>) -> Self {
        Self {
            width,
            rows,
            spans: Vec::new(),
            used: 0,
            emitted: false,
        }
    }

    fn push(&mut self, text: &str, style: Style, text_width: usize) {
        match self.spans.last_mut() {
            Some(last) if last.style == style => last.content.to_mut().push_str(text),
            _ => self.spans.push(Span::styled(text.to_string(), style)),
        }
        self.used += text_width;
    }

    fn break_row(&mut self) {
        self.rows.push(Line::from(std::mem::take(&mut self.spans)));
        self.used = 0;
        self.emitted = true;
    }

    fn space(&mut self, style: Style) {
        if self.used < self.width {
            self.push(" ", style, 1);
        } else {
            // A space that would overflow becomes the row break.
            self.break_row();
        }
    }

    /// Places a word on the current row, or on a fresh one when it does not
    /// fit. Words wider than the row are split across rows.
    fn word(&mut self, word: &mut Vec<(char, Style)>) {
        if word.is_empty() {
            return;
        }
        let word_width: usize = word.iter().map(|(ch, _)| char_width(*ch)).sum();
        if self.used > 0 && self.used + word_width > self.width {
            self.break_row();
        }
        let mut utf8 = [0u8; 4];
        for (ch, style) in word.drain(..) {
            let w = char_width(ch);
            if self.used > 0 && self.used + w > self.width {
                self.break_row();
            }
            self.push(ch.encode_utf8(&mut utf8), style, w);
        }
    }

    fn finish(mut self) {
        if !self.spans.is_empty() || !self.emitted {
            self.break_row();
        }
    }
}

fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

/// Wraps `lines` at word boundaries to `width` columns, keeping span styles.
///
/// The result is drawn without ratatui's own wrapping, so its length is the
/// exact number of rows on screen.
pub fn prewrap_lines(lines: &[Line<'_>], width: u16) -> Vec<Line<'static>> {
    let width = usize::from(width);
    let mut rows: Vec<Line<'static>> = Vec::with_capacity(lines.len());

    for line in lines {
        if width == 0 {
            let spans: Vec<Span<'static>> = line
                .spans
                .iter()
                .map(|span| Span::styled(span.content.to_string(), span.style))
                .collect();
            rows.push(Line::from(spans));
            continue;
        }

        let mut builder = RowBuilder::new(width, &mut rows);
        let mut word: Vec<(char, Style)> = Vec::new();
        for span in &line.spans {
            for ch in span.content.chars() {
                if ch == ' ' {
                    builder.word(&mut word);
                    builder.space(span.style);
                } else {
                    word.push((ch, span.style));
                }
            }
        }
        builder.word(&mut word);
        builder.finish();
    }

    rows
}

/// Rows `lines` occupy once wrapped to `width`.
pub fn wrapped_line_count(lines: &[Line<'_>], width: u16) -> u16 {
    u16::try_from(prewrap_lines(lines, width).len()).unwrap_or(u16::MAX)
}
