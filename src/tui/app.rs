//! TUI application state management.

use std::time::{Duration, Instant};

use crate::console::{Completion, Console, ReplyOrder, Submission};
use crate::utils::unicode::char_to_byte_index;

const DOUBLE_CTRL_C_TIMEOUT: Duration = Duration::from_millis(500);

/// Application state for the TUI
#[derive(Debug)]
pub struct App {
    /// Output log and in-flight bookkeeping
    pub console: Console,
    /// Command input field
    pub input: String,
    /// Cursor position in input (character index)
    pub input_cursor: usize,
    /// Server the console talks to, shown in the title
    pub server_url: String,
    /// Whether to show help
    pub show_help: bool,
    /// Timestamp of last Ctrl+C press for double Ctrl+C detection
    pub last_ctrl_c_time: Option<Instant>,
}

impl App {
    pub fn new(server_url: String, order: ReplyOrder) -> Self {
        Self {
            console: Console::new(order),
            input: String::new(),
            input_cursor: 0,
            server_url,
            show_help: false,
            last_ctrl_c_time: None,
        }
    }

    /// Enter pressed: hand back the command to send, if any.
    pub fn submit(&mut self) -> Option<Submission> {
        let submission = self.console.submit(&mut self.input)?;
        self.input_cursor = 0;
        Some(submission)
    }

    pub fn on_completion(&mut self, done: Completion) {
        self.console.complete(done.seq, done.outcome);
    }

    pub fn status_message(&self) -> String {
        let order = match self.console.order() {
            ReplyOrder::Resolution => "",
            ReplyOrder::Submission => " | ordered",
        };
        match self.console.in_flight() {
            0 => format!("Idle{} | F1 help | Esc quit", order),
            n => format!("{} pending{} | F1 help | Esc quit", n, order),
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    // ----- Log scrolling -----
    pub fn scroll_up(&mut self, lines: usize) {
        self.console.log_mut().scroll_up(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.console.log_mut().scroll_down(lines);
    }

    // ----- Input editing helpers -----
    fn input_chars(&self) -> usize {
        self.input.chars().count()
    }

    fn cursor_byte(&self) -> usize {
        char_to_byte_index(&self.input, self.input_cursor)
    }

    /// Text left of the cursor, for placing the terminal cursor.
    pub fn input_before_cursor(&self) -> &str {
        &self.input[..self.cursor_byte()]
    }

    pub fn move_cursor_left(&mut self) {
        self.input_cursor = self.input_cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.input_cursor < self.input_chars() {
            self.input_cursor += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.input_cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.input_cursor = self.input_chars();
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.cursor_byte();
        self.input.insert(at, c);
        self.input_cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.input_cursor == 0 {
            return;
        }
        self.input_cursor -= 1;
        let at = self.cursor_byte();
        self.input.remove(at);
    }

    pub fn delete(&mut self) {
        if self.input_cursor < self.input_chars() {
            let at = self.cursor_byte();
            self.input.remove(at);
        }
    }

    /// Handle Ctrl+C press and detect double press for quit
    /// Returns true if should quit (double Ctrl+C), false otherwise
    pub fn handle_ctrl_c(&mut self) -> bool {
        let now = Instant::now();

        if let Some(last_time) = self.last_ctrl_c_time {
            if now.duration_since(last_time) <= DOUBLE_CTRL_C_TIMEOUT {
                self.last_ctrl_c_time = None;
                return true;
            }
        }

        // Single Ctrl+C - clear input and record timestamp
        self.input.clear();
        self.input_cursor = 0;
        self.last_ctrl_c_time = Some(now);

        false
    }
}
