pub mod chat_stream;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod render_queue;
pub mod session;
pub mod surface;
