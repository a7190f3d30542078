//! UI layout and rendering logic for the TUI.

use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::app::App;
use crate::console::OutputLog;
use crate::utils::unicode::wrap_columns;

/// Render the main UI
pub fn render_ui(frame: &mut Frame, app: &mut App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Output log
            Constraint::Length(3), // Input area
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_output_area(frame, app, main_layout[0]);
    render_input_area(frame, app, main_layout[1]);
    render_status_bar(frame, app, main_layout[2]);

    if app.show_help {
        render_help_overlay(frame);
    }
}

fn entry_style(line: &str) -> Style {
    if line.starts_with("> ") {
        Style::default().fg(Color::Green)
    } else if line.starts_with("Error: ") {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Cyan)
    }
}

fn entry_rows(entry: &str, width: usize) -> Vec<Line<'static>> {
    let style = entry_style(entry);
    entry
        .split('\n')
        .flat_map(|line| wrap_columns(line, width))
        .map(|row| Line::from(Span::styled(row, style)))
        .collect()
}

/// Wrap entries newest first until at least `needed` rows exist.
///
/// Returns the rows in display order and whether every entry was wrapped.
fn tail_rows(log: &OutputLog, width: usize, needed: usize) -> (Vec<Line<'static>>, bool) {
    let mut chunks = Vec::new();
    let mut count = 0;
    let mut whole_log = true;
    for entry in log.entries().iter().rev() {
        if count >= needed {
            whole_log = false;
            break;
        }
        let rows = entry_rows(entry, width);
        count += rows.len();
        chunks.push(rows);
    }
    let rows = chunks.into_iter().rev().flatten().collect();
    (rows, whole_log)
}

/// First visible row so that the view ends `offset` rows above the bottom.
pub(crate) fn scroll_top(total_rows: usize, visible: usize, offset: usize) -> usize {
    let max_scroll = total_rows.saturating_sub(visible);
    max_scroll.saturating_sub(offset.min(max_scroll))
}

/// Render the output log, pinned to the bottom unless scrolled back.
fn render_output_area(frame: &mut Frame, app: &mut App, area: Rect) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let visible = area.height.saturating_sub(2) as usize;

    let log = app.console.log();
    let needed = visible.saturating_add(log.scroll_offset());
    let (rows, whole_log) = tail_rows(log, inner_width, needed);
    if whole_log {
        let max_scroll = rows.len().saturating_sub(visible);
        app.console.log_mut().clamp_scroll(max_scroll);
    }

    let log = app.console.log();
    let top = scroll_top(rows.len(), visible, log.scroll_offset());
    let shown: Vec<Line> = rows.into_iter().skip(top).take(visible).collect();

    let title = if log.is_at_bottom() {
        format!("Output - {}", app.server_url)
    } else {
        format!("Output - {} (scrolled, {} up)", app.server_url, log.scroll_offset())
    };

    let paragraph = Paragraph::new(Text::from(shown))
        .block(Block::default().borders(Borders::ALL).title(title));

    frame.render_widget(paragraph, area);
}

/// Render the input area and place the cursor in it
fn render_input_area(frame: &mut Frame, app: &App, area: Rect) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_col = app.input_before_cursor().width();
    let hscroll = if inner_width > 0 && cursor_col >= inner_width {
        cursor_col + 1 - inner_width
    } else {
        0
    };

    let input_paragraph = Paragraph::new(app.input.as_str())
        .block(Block::default().borders(Borders::ALL).title("Command"))
        .scroll((0, hscroll.min(u16::MAX as usize) as u16));
    frame.render_widget(input_paragraph, area);

    if !app.show_help {
        let x = area.x + 1 + (cursor_col - hscroll).min(u16::MAX as usize) as u16;
        frame.set_cursor_position(Position::new(x, area.y + 1));
    }
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status_paragraph = Paragraph::new(app.status_message())
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(status_paragraph, area);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame) {
    let popup_area = centered_rect(70, 60, frame.area());

    frame.render_widget(Clear, popup_area);

    let help_lines = vec![
        Line::from("Ledis Console Help"),
        Line::from(""),
        Line::from("Output:"),
        Line::from("  ↑/↓        - Scroll one line"),
        Line::from("  PgUp/PgDn  - Scroll one page"),
        Line::from(""),
        Line::from("Input:"),
        Line::from("  Enter      - Send command"),
        Line::from("  ←/→ Home/End - Move cursor"),
        Line::from(""),
        Line::from("  F1         - Toggle this help"),
        Line::from("  Ctrl+C     - Clear input (twice to quit)"),
        Line::from("  Esc        - Quit"),
    ];

    let help_paragraph = Paragraph::new(Text::from(help_lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .title_style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(help_paragraph, popup_area);
}

/// A box of `percent_x` by `percent_y` of `area`, centred in it.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Fill(1),
    ])
    .areas(area);
    let [_, popup, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Fill(1),
    ])
    .areas(middle);
    popup
}
