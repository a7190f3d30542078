//! Custom event types for TUI application.

use crossterm::event::KeyEvent;

use crate::console::Completion;

/// Events that can occur in the TUI application
#[derive(Debug)]
pub enum TuiEvent {
    /// User keyboard input
    Key(KeyEvent),
    /// Terminal was resized; redraw
    Resize,
    /// An `/execute` request finished
    Reply(Completion),
}

impl From<Completion> for TuiEvent {
    fn from(done: Completion) -> Self {
        TuiEvent::Reply(done)
    }
}
