//! The widgets the session controller drives.
//!
//! Front ends implement this for their own input line, buttons and busy
//! indicator; the transcript is reached through [`DisplayBuffer`].

use crate::ui::buffer::DisplayBuffer;

pub trait ChatSurface {
    fn input_text(&self) -> String;
    fn set_input_text(&mut self, text: &str);
    fn clear_input(&mut self) {
        self.set_input_text("");
    }
    fn set_input_enabled(&mut self, enabled: bool);
    fn set_send_enabled(&mut self, enabled: bool);
    fn set_stop_enabled(&mut self, enabled: bool);
    fn set_busy(&mut self, busy: bool);
    fn transcript(&mut self) -> &mut dyn DisplayBuffer;
}
