//! Terminal UI layer for interactive chat sessions.
//!
//! Key submodules include:
//! - [`buffer`]: the tagged transcript text that rendering writes into.
//! - [`markdown`]: line-by-line rendering of bold spans and code fences.
//! - [`chat_loop`]: the main interaction loop that feeds key presses to the
//!   session controller and drains streamed output.
//! - [`renderer`], [`view`] and [`theme`]: frame composition and styling.
//!
//! Ownership boundary: this layer presents and captures interaction state, while
//! [`crate::core`] owns the request lifecycle and backend coordination.

pub mod buffer;
pub mod chat_loop;
pub mod markdown;
pub mod renderer;
pub mod theme;
pub mod view;
