use std::time::Duration;

use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::core::constants::INDICATOR_SPACE;
use crate::ui::theme::Theme;
use crate::ui::view::ChatView;

/// Rows taken by the input box, borders included.
const INPUT_AREA_HEIGHT: u16 = 3;

/// What the title bar shows about the conversation partner.
#[derive(Clone, Debug)]
pub struct Header {
    pub model: String,
    pub endpoint_host: String,
}

impl Header {
    pub fn new(model: &str, endpoint: &str) -> Self {
        Self {
            model: model.to_string(),
            endpoint_host: endpoint_host(endpoint),
        }
    }

    pub fn title(&self) -> String {
        format!(
            "nimchat v{} - {} ({})",
            env!("CARGO_PKG_VERSION"),
            self.model,
            self.endpoint_host
        )
    }
}

fn endpoint_host(endpoint: &str) -> String {
    let without_scheme = endpoint
        .split_once("://")
        .map_or(endpoint, |(_, rest)| rest);
    without_scheme
        .split(['/', '?'])
        .next()
        .unwrap_or(without_scheme)
        .to_string()
}

fn split_area(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(INPUT_AREA_HEIGHT)])
        .split(area);
    (chunks[0], chunks[1])
}

/// Width and height available to transcript text inside `area`.
pub fn transcript_viewport(area: Rect) -> (u16, u16) {
    let (transcript, _) = split_area(area);
    // One row for the title.
    (transcript.width, transcript.height.saturating_sub(1))
}

/// Pulse symbol for the busy indicator, two cycles per second.
pub fn pulse_symbol(elapsed: Duration) -> char {
    let elapsed = elapsed.as_millis() as f32 / 1000.0;
    let pulse_phase = (elapsed * 2.0) % 2.0;
    let pulse_intensity = if pulse_phase < 1.0 {
        pulse_phase
    } else {
        2.0 - pulse_phase
    };

    if pulse_intensity < 0.33 {
        '○'
    } else if pulse_intensity < 0.66 {
        '◐'
    } else {
        '●'
    }
}

/// Input text padded to `inner_width` with the indicator near the right border.
fn input_with_indicator(
    input: &str,
    inner_width: usize,
    symbol: char,
    text_style: Style,
    indicator_style: Style,
) -> Line<'static> {
    let mut text = vec![' '; inner_width.saturating_sub(2)];
    let input_chars: Vec<char> = input.chars().collect();
    let max_input_len = inner_width.saturating_sub(INDICATOR_SPACE as usize);

    for (i, &ch) in input_chars.iter().take(max_input_len).enumerate() {
        text[i] = ch;
    }

    if input_chars.len() > max_input_len && max_input_len >= 3 {
        text[max_input_len - 3..max_input_len].fill('.');
    }

    let mut spans = vec![Span::styled(text.into_iter().collect::<String>(), text_style)];
    if inner_width > 1 {
        spans.push(Span::styled(symbol.to_string(), indicator_style));
        spans.push(Span::styled(" ", text_style));
    }
    Line::from(spans)
}

fn input_title(view: &ChatView) -> &'static str {
    if view.can_stop() {
        "Waiting for reply (Esc to stop, Ctrl+C to quit)"
    } else {
        "Type your question (Enter to send, Ctrl+C to quit)"
    }
}

pub fn ui(f: &mut Frame, view: &ChatView, theme: &Theme, header: &Header) {
    let (transcript_area, input_area) = split_area(f.area());

    let (width, height) = transcript_viewport(f.area());
    let rows = view.wrapped_lines(theme, width);
    let row_count = u16::try_from(rows.len()).unwrap_or(u16::MAX);
    let scroll_offset = view.scroll_for_rows(row_count, height);

    // Rows are pre-wrapped so the scroll offset counts exactly what is drawn.
    let transcript = Paragraph::new(rows)
        .style(Style::default().bg(theme.background_color))
        .block(Block::default().title(header.title()).title_style(theme.title_style))
        .scroll((scroll_offset, 0));
    f.render_widget(transcript, transcript_area);

    let text_style = if view.is_input_enabled() {
        theme.input_text_style
    } else {
        theme.input_disabled_style
    };

    let inner_width = usize::from(input_area.width.saturating_sub(2));
    let input_line = if view.is_busy() {
        input_with_indicator(
            view.input(),
            inner_width,
            pulse_symbol(view.pulse_start.elapsed()),
            text_style,
            theme.streaming_indicator_style,
        )
    } else {
        Line::styled(view.input().to_string(), text_style)
    };

    let input = Paragraph::new(input_line)
        .style(text_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.input_border_style)
                .title(input_title(view))
                .title_style(theme.input_title_style),
        );
    f.render_widget(input, input_area);

    if view.is_input_enabled() {
        let typed = u16::try_from(UnicodeWidthStr::width(view.input())).unwrap_or(u16::MAX);
        let max_x = input_area.width.saturating_sub(2);
        f.set_cursor_position(Position::new(
            input_area.x + 1 + typed.min(max_x),
            input_area.y + 1,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::surface::ChatSurface;
    use crate::ui::buffer::WritableScope;
    use ratatui::{backend::TestBackend, style::Color, Terminal};

    #[test]
    fn header_title_names_model_and_host() {
        let header = Header::new(
            "deepseek-ai/deepseek-r1",
            "https://integrate.api.nvidia.com/v1/chat/completions",
        );
        assert_eq!(header.endpoint_host, "integrate.api.nvidia.com");
        assert!(header.title().ends_with("deepseek-ai/deepseek-r1 (integrate.api.nvidia.com)"));
        assert_eq!(endpoint_host("localhost:8080"), "localhost:8080");
    }

    #[test]
    fn pulse_cycles_through_symbols() {
        assert_eq!(pulse_symbol(Duration::from_millis(0)), '○');
        assert_eq!(pulse_symbol(Duration::from_millis(250)), '◐');
        assert_eq!(pulse_symbol(Duration::from_millis(450)), '●');
        assert_eq!(pulse_symbol(Duration::from_millis(900)), '○');
    }

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    fn rendered_rows(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        let width = usize::from(buffer.area.width);
        let cells: Vec<&str> = buffer.content().iter().map(|cell| cell.symbol()).collect();
        cells.chunks(width).map(|row| row.concat()).collect()
    }

    #[test]
    fn indicator_sits_before_the_right_border() {
        let text_style = Style::default();
        let indicator_style = Style::default().fg(Color::Yellow);
        let line = input_with_indicator("hello", 12, '●', text_style, indicator_style);
        let text = line_text(&line);
        assert_eq!(text.chars().count(), 12);
        assert!(text.starts_with("hello"));
        assert_eq!(text.chars().nth(10), Some('●'));
        assert_eq!(line.spans[1].content, "●");
        assert_eq!(line.spans[1].style, indicator_style);

        let truncated = input_with_indicator("a long question here", 12, '●', text_style, indicator_style);
        assert!(line_text(&truncated).starts_with("a lon..."));
    }

    #[test]
    fn auto_scroll_shows_the_newest_word_wrapped_line() {
        let backend = TestBackend::new(10, 8);
        let mut terminal = Terminal::new(backend).expect("terminal");
        let theme = Theme::monochrome();
        let header = Header::new("m", "http://localhost/v1");
        let mut view = ChatView::new();
        {
            let mut buffer = WritableScope::new(view.transcript());
            buffer
                .insert(&"aaaaaa bbbbbb cccccc\n".repeat(4))
                .expect("insert");
            buffer.insert("LASTLINE\n").expect("insert");
        }

        terminal
            .draw(|f| ui(f, &view, &theme, &header))
            .expect("draw");

        let rows = rendered_rows(&terminal);
        // Title row, then four transcript rows above the input box.
        assert_eq!(rows[4].trim_end(), "LASTLINE");
        assert_eq!(rows[3].trim_end(), "cccccc");
    }

    #[test]
    fn draws_transcript_and_busy_input() {
        let backend = TestBackend::new(40, 10);
        let mut terminal = Terminal::new(backend).expect("terminal");
        let theme = Theme::dark_default();
        let header = Header::new("m", "http://localhost/v1");
        let mut view = ChatView::new();
        {
            let mut buffer = WritableScope::new(view.transcript());
            buffer.insert("You: hi\nHello there\n").expect("insert");
        }
        view.set_busy(true);
        view.set_input_enabled(false);

        terminal
            .draw(|f| ui(f, &view, &theme, &header))
            .expect("draw");

        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(rendered.contains("nimchat v"));
        assert!(rendered.contains("Hello there"));
        assert!(rendered.contains("Type your question"));
    }
}
