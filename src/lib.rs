//! nimchat is a terminal chat client that streams answers from
//! OpenAI-compatible chat completion endpoints.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns configuration, the streaming worker, the render queue and
//!   the session controller that ties a request to the display.
//! - [`ui`] renders the terminal interface, including the incremental
//!   Markdown renderer, and runs the interactive event loop.
//! - [`api`] defines the chat request and streamed response payloads.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which dispatches into [`ui::chat_loop`] for
//! interactive sessions and [`cli::ask`] for one-shot questions.

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
