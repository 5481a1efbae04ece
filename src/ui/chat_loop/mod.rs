//! Interactive chat front end: terminal setup, key handling and the main loop.

mod event_loop;
mod keybindings;
mod lifecycle;

pub use event_loop::{run_chat, ChatSettings};
