//! Status bar
//!
//! Displays connection status, room information and the latest notice.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use turf_app::state_label;
use turf_core::ConnectionState;

use crate::App;

/// Render the status bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.connection_state();
    let style = match state {
        ConnectionState::Disconnected => Style::default().fg(Color::Red),
        ConnectionState::Connecting => Style::default().fg(Color::Yellow),
        ConnectionState::Connected => {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        },
        ConnectionState::ClosedForbidden => {
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
        },
    };

    let room_info = format!(" | #{} | Messages: {}", app.room_id(), app.messages().len());

    let mut spans = vec![
        Span::raw(" "),
        Span::styled(state_label(state), style),
        Span::styled(room_info, Style::default().fg(Color::Gray)),
    ];
    if let Some(message) = app.status_message() {
        spans.push(Span::raw(" | "));
        spans.push(Span::raw(message));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}
