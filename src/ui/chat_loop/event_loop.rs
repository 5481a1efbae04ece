//! Event polling, render-queue draining and redraws.
//!
//! Terminal input arrives from a reader task over an unbounded channel.
//! The loop drains the render queue every poll interval and redraws at most
//! [`MAX_FPS`] times a second, continuously while the busy indicator pulses.

use std::{
    error::Error,
    time::{Duration, Instant},
};

use ratatui::crossterm::event::{self, Event};
use ratatui::layout::Rect;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::core::chat_stream::{ChatStreamService, TransportClient};
use crate::core::session::{RequestTemplate, SessionController};
use crate::ui::renderer::{transcript_viewport, ui, Header};
use crate::ui::theme::Theme;
use crate::ui::view::ChatView;

use super::keybindings::{handle_event, KeyContext, KeyResult};
use super::lifecycle::{install_panic_hook, restore_terminal, setup_terminal, ChatTerminal};

const MAX_FPS: u64 = 60;

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

/// Everything the interactive loop needs, resolved from config and flags.
pub struct ChatSettings {
    pub transport: TransportClient,
    pub template: RequestTemplate,
    pub poll_interval: Duration,
    pub theme: Theme,
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => {
                        continue;
                    }
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

fn key_context(terminal: &ChatTerminal) -> KeyContext {
    let (width, height) = match terminal.size() {
        Ok(size) => transcript_viewport(Rect::new(0, 0, size.width, size.height)),
        Err(_) => (80, 24),
    };
    KeyContext { width, height }
}

pub async fn run_chat(settings: ChatSettings) -> Result<(), Box<dyn Error>> {
    let ChatSettings {
        transport,
        template,
        poll_interval,
        theme,
    } = settings;

    let header = Header::new(&template.model, transport.endpoint());
    let (stream_service, drain) = ChatStreamService::new(transport);
    let mut controller = SessionController::new(template, drain);
    let mut view = ChatView::new();

    install_panic_hook();
    let mut terminal = setup_terminal()?;
    info!(model = %header.model, host = %header.endpoint_host, "Chat session started");

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(event_tx);

    let frame_duration = Duration::from_millis(1000 / MAX_FPS);
    let mut last_draw = Instant::now() - frame_duration;
    let mut last_drain = Instant::now();
    let mut request_redraw = true;

    let result: Result<(), Box<dyn Error>> = 'main_loop: loop {
        let now = Instant::now();
        if view.is_busy() && now.duration_since(last_draw) >= frame_duration {
            request_redraw = true;
        }
        if request_redraw && now.duration_since(last_draw) >= frame_duration {
            if let Err(err) = terminal.draw(|f| ui(f, &view, &theme, &header)) {
                break 'main_loop Err(err.into());
            }
            last_draw = now;
            request_redraw = false;
        }

        let ctx = key_context(&terminal);
        let mut events_processed = false;
        while let Ok(UiEvent::Crossterm(ev)) = event_rx.try_recv() {
            events_processed = true;
            match handle_event(ev, &mut view, &mut controller, &stream_service, ctx) {
                KeyResult::Exit => break 'main_loop Ok(()),
                KeyResult::Handled => request_redraw = true,
                KeyResult::Ignored => {}
            }
        }

        if last_drain.elapsed() >= poll_interval {
            last_drain = Instant::now();
            let report = controller.drain(&mut view);
            if report.drained > 0 {
                request_redraw = true;
            }
            if let Some(end) = report.ended {
                debug!(?end, chunks = report.chunks, "Stream ended");
            }
        }

        if !events_processed {
            tokio::time::sleep(Duration::from_millis(16)).await;
        }
    };

    event_reader_handle.abort();
    controller.shutdown();
    restore_terminal(&mut terminal)?;
    info!("Chat session closed");
    result
}
