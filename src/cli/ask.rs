//! TUI-less "ask" command

use std::error::Error;
use std::io::{self, Write};

use crate::core::chat_stream::{ChatStreamService, StreamParams, StreamSession, TransportClient};
use crate::core::render_queue::{RenderDrain, RenderMessage};
use crate::core::session::RequestTemplate;

#[derive(Debug, PartialEq, Eq)]
pub enum AskOutcome {
    Completed(String),
    Failed(String),
}

/// Copies reply lines from `drain` to `out` until the stream ends.
///
/// On completion the part of the reply that never arrived as a full line is
/// written too, followed by a newline.
pub async fn write_reply<W: Write>(drain: &mut RenderDrain, out: &mut W) -> io::Result<AskOutcome> {
    let mut printed = 0usize;
    while let Some((message, _)) = drain.recv().await {
        match message {
            RenderMessage::Chunk(line) => {
                printed += line.len();
                out.write_all(line.as_bytes())?;
                out.flush()?;
            }
            RenderMessage::Complete(full_reply) => {
                let tail = full_reply.get(printed..).unwrap_or_default();
                writeln!(out, "{tail}")?;
                out.flush()?;
                return Ok(AskOutcome::Completed(full_reply));
            }
            RenderMessage::Error(err) => return Ok(AskOutcome::Failed(err)),
        }
    }
    Ok(AskOutcome::Failed("stream closed without a reply".to_string()))
}

pub async fn run_ask(
    prompt: &[String],
    transport: TransportClient,
    template: RequestTemplate,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: nimchat ask <prompt>");
        std::process::exit(1);
    }

    let (stream_service, mut drain) = ChatStreamService::new(transport);
    let request = template.build(&prompt);
    stream_service.spawn_stream(StreamParams {
        request,
        session: StreamSession::new(prompt, 1),
    });

    let mut stdout = io::stdout();
    match write_reply(&mut drain, &mut stdout).await? {
        AskOutcome::Completed(_) => Ok(()),
        AskOutcome::Failed(err) => {
            eprintln!("\n❌ Error: {err}");
            std::process::exit(1);
        }
    }
}
