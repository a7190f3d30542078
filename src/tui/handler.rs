//! Async event handler for the TUI console.

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use tokio::sync::mpsc;

use super::{app::App, events::TuiEvent, ui::render_ui};
use crate::client::ExecuteClient;
use crate::console::{spawn_request, ReplyOrder};

const PAGE: usize = 10;

/// Run the TUI console until the user quits.
pub async fn run_tui(client: ExecuteClient, server_url: String, order: ReplyOrder) -> Result<()> {
    if !io::IsTerminal::is_terminal(&io::stdout()) {
        return Err(anyhow::anyhow!("TUI mode requires a proper terminal environment"));
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(server_url, order);
    let (event_tx, event_rx) = mpsc::unbounded_channel::<TuiEvent>();

    let result = run_app(&mut terminal, &mut app, &client, event_tx, event_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    client: &ExecuteClient,
    event_tx: mpsc::UnboundedSender<TuiEvent>,
    mut event_rx: mpsc::UnboundedReceiver<TuiEvent>,
) -> Result<()> {
    // Terminal input is read on a blocking thread and forwarded as events.
    let input_tx = event_tx.clone();
    tokio::task::spawn_blocking(move || {
        while !input_tx.is_closed() {
            if !event::poll(Duration::from_millis(100)).unwrap_or(false) {
                continue;
            }
            let forwarded = match event::read() {
                Ok(Event::Key(key)) => input_tx.send(TuiEvent::Key(key)),
                Ok(Event::Resize(_, _)) => input_tx.send(TuiEvent::Resize),
                _ => Ok(()),
            };
            if forwarded.is_err() {
                break;
            }
        }
    });

    loop {
        terminal.draw(|frame| render_ui(frame, app))?;

        let Some(tui_event) = event_rx.recv().await else {
            break;
        };
        match tui_event {
            TuiEvent::Key(key) => {
                if handle_key_event(app, key, client, &event_tx) {
                    break;
                }
            }
            TuiEvent::Reply(done) => app.on_completion(done),
            TuiEvent::Resize => {}
        }
    }

    Ok(())
}

/// Handle keyboard events. Returns `true` when the user asked to quit.
fn handle_key_event(
    app: &mut App,
    key: KeyEvent,
    client: &ExecuteClient,
    event_tx: &mpsc::UnboundedSender<TuiEvent>,
) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return app.handle_ctrl_c();
        }
        KeyCode::Esc if app.show_help => app.toggle_help(),
        KeyCode::Esc => return true,
        KeyCode::F(1) => app.toggle_help(),
        KeyCode::Enter => {
            if let Some(submission) = app.submit() {
                spawn_request(client, submission, event_tx.clone());
            }
        }
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(PAGE),
        KeyCode::PageDown => app.scroll_down(PAGE),
        KeyCode::Left => app.move_cursor_left(),
        KeyCode::Right => app.move_cursor_right(),
        KeyCode::Home => app.move_cursor_home(),
        KeyCode::End => app.move_cursor_end(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            app.insert_char(c)
        }
        _ => {}
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[tokio::test]
    async fn test_modified_chars_are_not_typed() {
        let client = ExecuteClient::new("http://127.0.0.1:9", None).unwrap();
        let (tx, _rx) = mpsc::unbounded_channel::<TuiEvent>();
        let mut app = App::new("http://127.0.0.1:9".into(), ReplyOrder::Resolution);

        for (code, modifiers) in [
            (KeyCode::Char('g'), KeyModifiers::NONE),
            (KeyCode::Char('a'), KeyModifiers::CONTROL),
            (KeyCode::Char('x'), KeyModifiers::ALT),
            (KeyCode::Char('E'), KeyModifiers::SHIFT),
        ] {
            assert!(!handle_key_event(&mut app, press(code, modifiers), &client, &tx));
        }
        assert_eq!(app.input, "gE");
    }

    #[tokio::test]
    async fn test_esc_quits() {
        let client = ExecuteClient::new("http://127.0.0.1:9", None).unwrap();
        let (tx, _rx) = mpsc::unbounded_channel::<TuiEvent>();
        let mut app = App::new("http://127.0.0.1:9".into(), ReplyOrder::Resolution);
        assert!(handle_key_event(&mut app, press(KeyCode::Esc, KeyModifiers::NONE), &client, &tx));
    }
}
