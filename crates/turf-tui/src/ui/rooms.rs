//! Rooms sidebar
//!
//! Displays the rooms from the last room-list fetch. The active room is
//! always shown, even when the list does not contain it.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

use crate::App;

const ACTIVE_PREFIX: &str = ">";
const INACTIVE_PREFIX: &str = " ";
const GROUP_MARKER: &str = "#";
const DIRECT_MARKER: &str = "@";

/// Render the rooms sidebar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let active = app.room_id();
    let mut items: Vec<ListItem> = Vec::new();

    if !app.rooms().iter().any(|r| &r.id == active) {
        items.push(room_item(GROUP_MARKER, active.as_str(), true));
    }

    items.extend(app.rooms().iter().map(|room| {
        let marker = if room.is_group { GROUP_MARKER } else { DIRECT_MARKER };
        room_item(marker, &room.name, &room.id == active)
    }));

    let block = Block::default().borders(Borders::ALL).title(" Rooms ");
    frame.render_widget(List::new(items).block(block), area);
}

fn room_item<'a>(marker: &'a str, name: &'a str, active: bool) -> ListItem<'a> {
    let (prefix, style) = if active {
        (ACTIVE_PREFIX, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    } else {
        (INACTIVE_PREFIX, Style::default())
    };

    ListItem::new(Line::from(vec![
        Span::raw(prefix),
        Span::styled(marker, style),
        Span::styled(name, style),
    ]))
}
