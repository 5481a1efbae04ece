//! Maps terminal events onto view and session actions.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::debug;

use crate::core::chat_stream::ChatStreamService;
use crate::core::session::SessionController;
use crate::ui::view::ChatView;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyResult {
    Handled,
    Ignored,
    Exit,
}

/// Transcript viewport dimensions used for scrolling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyContext {
    pub width: u16,
    pub height: u16,
}

pub fn handle_event(
    event: Event,
    view: &mut ChatView,
    controller: &mut SessionController,
    service: &ChatStreamService,
    ctx: KeyContext,
) -> KeyResult {
    match event {
        Event::Key(key) => handle_key(key, view, controller, service, ctx),
        Event::Paste(text) => {
            view.insert_str(&text);
            KeyResult::Handled
        }
        Event::Resize(_, _) => KeyResult::Handled,
        _ => KeyResult::Ignored,
    }
}

fn handle_key(
    key: KeyEvent,
    view: &mut ChatView,
    controller: &mut SessionController,
    service: &ChatStreamService,
    ctx: KeyContext,
) -> KeyResult {
    if key.kind != KeyEventKind::Press {
        return KeyResult::Ignored;
    }

    let page = ctx.height.saturating_sub(1).max(1);
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyResult::Exit,
        KeyCode::Enter => {
            if !view.can_send() {
                return KeyResult::Ignored;
            }
            if let Some(params) = controller.send(view) {
                view.scroll_to_bottom();
                service.spawn_stream(params);
            }
            KeyResult::Handled
        }
        KeyCode::Esc => {
            if !view.can_stop() {
                return KeyResult::Ignored;
            }
            controller.stop(view);
            debug!("Stop requested from keyboard");
            KeyResult::Handled
        }
        KeyCode::Backspace => {
            view.backspace();
            KeyResult::Handled
        }
        KeyCode::Up => {
            view.scroll_up(1, ctx.width, ctx.height);
            KeyResult::Handled
        }
        KeyCode::Down => {
            view.scroll_down(1, ctx.width, ctx.height);
            KeyResult::Handled
        }
        KeyCode::PageUp => {
            view.scroll_up(page, ctx.width, ctx.height);
            KeyResult::Handled
        }
        KeyCode::PageDown => {
            view.scroll_down(page, ctx.width, ctx.height);
            KeyResult::Handled
        }
        KeyCode::Home => {
            view.scroll_to_top();
            KeyResult::Handled
        }
        KeyCode::End => {
            view.scroll_to_bottom();
            KeyResult::Handled
        }
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            view.insert_char(c);
            KeyResult::Handled
        }
        _ => KeyResult::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chat_stream::TransportClient;
    use crate::core::config::Config;
    use crate::core::session::{RequestTemplate, SessionState};
    use crate::core::surface::ChatSurface;
    use crate::ui::buffer::WritableScope;

    const CTX: KeyContext = KeyContext {
        width: 80,
        height: 10,
    };

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn harness() -> (ChatView, SessionController, ChatStreamService) {
        let transport = TransportClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/v1/chat/completions".to_string(),
            String::new(),
        );
        let (service, drain) = ChatStreamService::new(transport);
        let template = RequestTemplate {
            model: "test-model".to_string(),
            system_prompt: None,
            params: Config::default().decoding_params(),
        };
        (ChatView::new(), SessionController::new(template, drain), service)
    }

    #[test]
    fn typing_and_ctrl_c() {
        let (mut view, mut controller, service) = harness();
        for c in "hi!".chars() {
            handle_event(press(KeyCode::Char(c)), &mut view, &mut controller, &service, CTX);
        }
        handle_event(press(KeyCode::Backspace), &mut view, &mut controller, &service, CTX);
        assert_eq!(view.input(), "hi");

        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(
            handle_event(ctrl_c, &mut view, &mut controller, &service, CTX),
            KeyResult::Exit
        );
        assert_eq!(view.input(), "hi");
    }

    #[test]
    fn escape_is_ignored_while_idle() {
        let (mut view, mut controller, service) = harness();
        assert_eq!(
            handle_event(press(KeyCode::Esc), &mut view, &mut controller, &service, CTX),
            KeyResult::Ignored
        );
        assert_eq!(controller.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn enter_starts_a_stream_and_escape_stops_it() {
        let (mut view, mut controller, service) = harness();
        view.insert_str("why?");

        handle_event(press(KeyCode::Enter), &mut view, &mut controller, &service, CTX);
        assert_eq!(controller.state(), SessionState::Streaming);
        assert!(view.can_stop());
        assert!(!view.can_send());

        // A second Enter is rejected while the first request runs.
        assert_eq!(
            handle_event(press(KeyCode::Enter), &mut view, &mut controller, &service, CTX),
            KeyResult::Ignored
        );

        handle_event(press(KeyCode::Esc), &mut view, &mut controller, &service, CTX);
        assert_eq!(controller.state(), SessionState::Idle);
        assert!(view.can_send());
        assert!(view.transcript_buffer().text().contains("[interrupted by user]"));
    }

    #[test]
    fn scroll_keys_move_the_viewport() {
        let (mut view, mut controller, service) = harness();
        {
            let text: String = (0..40).map(|i| format!("row {i}\n")).collect();
            let mut buffer = WritableScope::new(view.transcript());
            buffer.insert(&text).expect("insert");
        }

        handle_event(press(KeyCode::PageUp), &mut view, &mut controller, &service, CTX);
        assert_eq!(view.effective_scroll(CTX.width, CTX.height), 21);
        handle_event(press(KeyCode::Home), &mut view, &mut controller, &service, CTX);
        assert_eq!(view.effective_scroll(CTX.width, CTX.height), 0);
        handle_event(press(KeyCode::End), &mut view, &mut controller, &service, CTX);
        assert!(view.auto_scroll);
    }
}
