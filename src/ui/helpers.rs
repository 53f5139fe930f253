use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::Song;

/// Metadata line shown under the title in the detail view, e.g.
/// `Key: G  •  Hymn`. Blank fields are skipped.
pub(crate) fn song_meta_line(song: &Song) -> Line<'static> {
    let label_style = Style::default().fg(Color::Gray);
    let value_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);

    let mut spans = Vec::new();
    if !song.key.trim().is_empty() {
        spans.push(Span::styled("Key: ", label_style));
        spans.push(Span::styled(song.key.trim().to_string(), value_style));
    }
    if !song.category.trim().is_empty() {
        if !spans.is_empty() {
            spans.push(Span::styled("  •  ", label_style));
        }
        spans.push(Span::styled(song.category.trim().to_string(), label_style));
    }
    Line::from(spans)
}

/// Message shown when the list is legitimately empty.
pub(crate) fn empty_list_message(has_query: bool) -> &'static str {
    if has_query {
        "No songs match the current search."
    } else {
        "The songbook is empty."
    }
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}
