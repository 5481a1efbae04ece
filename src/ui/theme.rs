use ratatui::style::{Color, Modifier, Style};

use crate::ui::buffer::StyleTag;

#[derive(Debug, Clone)]
pub struct Theme {
    pub background_color: Color,
    // Transcript styles
    pub reply_text_style: Style,
    pub bold_style: Style,
    pub code_style: Style,
    pub prompt_style: Style,
    pub error_style: Style,
    pub notice_style: Style,

    // Chrome
    pub title_style: Style,
    pub streaming_indicator_style: Style,
    pub input_border_style: Style,
    pub input_title_style: Style,
    pub input_text_style: Style,
    pub input_disabled_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            background_color: Color::Black,
            reply_text_style: Style::default().fg(Color::White),
            bold_style: Style::default().add_modifier(Modifier::BOLD),
            code_style: Style::default()
                .fg(Color::Rgb(0xd7, 0xd7, 0xaf))
                .bg(Color::Rgb(0x26, 0x26, 0x26)),
            prompt_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            error_style: Style::default().fg(Color::LightRed),
            notice_style: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),

            title_style: Style::default().fg(Color::Gray),
            streaming_indicator_style: Style::default().fg(Color::White),
            input_border_style: Style::default().fg(Color::Gray),
            input_title_style: Style::default().fg(Color::Gray),
            input_text_style: Style::default().fg(Color::White),
            input_disabled_style: Style::default().fg(Color::DarkGray),
        }
    }

    pub fn light() -> Self {
        Theme {
            background_color: Color::White,
            reply_text_style: Style::default().fg(Color::Black),
            bold_style: Style::default().add_modifier(Modifier::BOLD),
            code_style: Style::default()
                .fg(Color::Rgb(0x30, 0x30, 0x30))
                .bg(Color::Rgb(0xf0, 0xf0, 0xf0)),
            prompt_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            error_style: Style::default().fg(Color::Red),
            notice_style: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::ITALIC),

            title_style: Style::default().fg(Color::DarkGray),
            streaming_indicator_style: Style::default().fg(Color::Black),
            input_border_style: Style::default().fg(Color::Black),
            input_title_style: Style::default().fg(Color::DarkGray),
            input_text_style: Style::default().fg(Color::Black),
            input_disabled_style: Style::default().fg(Color::Gray),
        }
    }

    /// No colors at all; only modifiers distinguish styled text.
    pub fn monochrome() -> Self {
        Theme {
            background_color: Color::Reset,
            reply_text_style: Style::default(),
            bold_style: Style::default().add_modifier(Modifier::BOLD),
            code_style: Style::default().add_modifier(Modifier::DIM),
            prompt_style: Style::default().add_modifier(Modifier::BOLD),
            error_style: Style::default().add_modifier(Modifier::REVERSED),
            notice_style: Style::default().add_modifier(Modifier::ITALIC),

            title_style: Style::default(),
            streaming_indicator_style: Style::default(),
            input_border_style: Style::default(),
            input_title_style: Style::default(),
            input_text_style: Style::default(),
            input_disabled_style: Style::default().add_modifier(Modifier::DIM),
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "light" => Self::light(),
            "mono" | "monochrome" => Self::monochrome(),
            _ => Self::dark_default(),
        }
    }

    pub fn tag_style(&self, tag: StyleTag) -> Style {
        match tag {
            StyleTag::Bold => self.bold_style,
            StyleTag::Code => self.code_style,
            StyleTag::Prompt => self.prompt_style,
            StyleTag::Error => self.error_style,
            StyleTag::Notice => self.notice_style,
        }
    }

    /// Layers the styles of `tags` over the reply text style, in order.
    pub fn segment_style(&self, tags: &[StyleTag]) -> Style {
        tags.iter()
            .fold(self.reply_text_style, |style, tag| style.patch(self.tag_style(*tag)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_inside_code_keeps_both_styles() {
        let theme = Theme::dark_default();
        let style = theme.segment_style(&[StyleTag::Code, StyleTag::Bold]);
        assert!(style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(style.bg, theme.code_style.bg);
    }

    #[test]
    fn unknown_theme_names_fall_back_to_dark() {
        assert_eq!(
            Theme::from_name("nope").background_color,
            Theme::dark_default().background_color
        );
        assert_eq!(Theme::from_name("LIGHT").background_color, Color::White);
        assert_eq!(Theme::from_name("mono").background_color, Color::Reset);
    }
}
