//! Message composer
//!
//! Shows the draft with a cursor. Sending needs a live connection, so the
//! prompt is dimmed and a read-only hint replaces the placeholder otherwise.
//! Commands still work while read-only.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use turf_core::ConnectionState;

use crate::App;

const PROMPT: &str = "> ";
const PROMPT_WIDTH: u16 = 3; // border + prompt
const INPUT_LINE_OFFSET_Y: u16 = 1; // inside top border
const RIGHT_PADDING: u16 = 1; // inside right border

/// Render the composer for the active room.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let connected = app.connection_state() == ConnectionState::Connected;
    let draft = app.input().buffer();

    let (prompt_style, border_style) = if connected {
        (Style::default().fg(Color::White), Style::default())
    } else {
        let dim = Style::default().fg(Color::DarkGray);
        (dim, dim)
    };

    let body = match (draft.is_empty(), connected) {
        (false, _) => Span::styled(draft, Style::default().fg(Color::White)),
        (true, true) => Span::styled(
            format!("Message #{}", app.room_id()),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ),
        (true, false) => {
            Span::styled(offline_hint(app.connection_state()), Style::default().fg(Color::DarkGray))
        },
    };

    let block = Block::default().borders(Borders::ALL).border_style(border_style);
    let line = Line::from(vec![Span::styled(PROMPT, prompt_style), body]);
    frame.render_widget(Paragraph::new(line).block(block), area);

    let available_width = area.width.saturating_sub(PROMPT_WIDTH + RIGHT_PADDING);
    let cursor_offset =
        u16::try_from(app.input().cursor()).unwrap_or(u16::MAX).min(available_width);

    let cursor_x = area.x.saturating_add(PROMPT_WIDTH).saturating_add(cursor_offset);
    let cursor_y = area.y.saturating_add(INPUT_LINE_OFFSET_Y);
    let max_x = area.x.saturating_add(area.width).saturating_sub(RIGHT_PADDING);
    frame.set_cursor_position((cursor_x.min(max_x), cursor_y));
}

fn offline_hint(state: ConnectionState) -> &'static str {
    match state {
        ConnectionState::Connecting => "(connecting...)",
        ConnectionState::ClosedForbidden => "(read-only: not a member, /retry after joining)",
        ConnectionState::Disconnected | ConnectionState::Connected => "(offline: /retry to reconnect)",
    }
}
