//! Chat area
//!
//! Displays the messages inside the App's viewport, one per row: avatar
//! initial, time, sender, body.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};
use turf_core::Message;

use crate::App;

const ATTACHMENT_MARKER: &str = "[attachment]";

/// Render the chat area.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let mut title = format!(" #{} ", app.room_id());
    if app.is_loading_history() {
        title.push_str("(loading older messages) ");
    }
    let block = Block::default().borders(Borders::ALL).title(title);

    let items: Vec<ListItem> = if app.messages().next().is_none() {
        vec![ListItem::new(Line::from(Span::styled(
            "No messages yet",
            Style::default().fg(Color::DarkGray),
        )))]
    } else {
        app.visible_messages().map(|msg| message_item(msg, app.user_id())).collect()
    };

    frame.render_widget(List::new(items).block(block), area);
}

fn message_item<'a>(msg: &'a Message, user_id: Option<&str>) -> ListItem<'a> {
    let own = user_id.is_some_and(|id| msg.is_from(id));
    let sender_color = if own { Color::Cyan } else { Color::Green };

    let avatar = msg.avatar_initial().map_or_else(|| "?".to_owned(), String::from);

    let mut spans = vec![
        Span::styled(
            avatar,
            Style::default().fg(Color::Black).bg(sender_color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(msg.time_label().unwrap_or_default(), Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
        Span::styled(
            format!("<{}>", msg.display_name()),
            Style::default().fg(sender_color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::raw(msg.body.as_str()),
    ];
    if msg.attachment_url.is_some() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(ATTACHMENT_MARKER, Style::default().fg(Color::Magenta)));
    }

    ListItem::new(Line::from(spans))
}
