//! Sidebar component: the session list
//!
//! The right border doubles as the drag handle for resizing.

use crate::model::SessionId;
use crate::store::Snapshot;
use crate::theme::Palette;
use crate::util::truncate_to_width;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};
use std::collections::HashSet;

pub struct SidebarView<'a> {
    pub snapshot: &'a Snapshot,
    pub pending: &'a HashSet<SessionId>,
    pub dragging: bool,
    pub palette: &'a Palette,
}

/// Lines each session occupies in the list
const ROWS_PER_SESSION: u16 = 2;

/// Draws the list and returns its scroll offset
pub fn render(f: &mut Frame, area: Rect, view: SidebarView<'_>) -> usize {
    let SidebarView {
        snapshot,
        pending,
        dragging,
        palette,
    } = view;

    let handle_color = if dragging {
        palette.border_focused
    } else {
        palette.border
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(palette.border_type)
        .border_style(Style::default().fg(handle_color))
        .title(format!(" Conversations ({}) ", snapshot.sessions.len()))
        .title_style(Style::default().fg(palette.foreground).add_modifier(Modifier::BOLD));

    // Two lines per session: title, then message count / preview
    let text_width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = snapshot
        .sessions
        .iter()
        .map(|session| {
            let marker = if pending.contains(&session.id) { "⋯ " } else { "" };
            let title = truncate_to_width(
                &format!("{}{}", marker, session.title),
                text_width,
            );
            let detail = match session.preview() {
                Some(preview) => format!(
                    "{} · {}",
                    session.messages.len(),
                    preview.replace('\n', " ")
                ),
                None => "empty".to_string(),
            };
            ListItem::new(vec![
                Line::from(Span::styled(title, Style::default().fg(palette.foreground))),
                Line::from(Span::styled(
                    truncate_to_width(&detail, text_width),
                    Style::default().fg(palette.muted),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(palette.selection)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▌");

    let mut state = ListState::default().with_selected(Some(snapshot.active_index));
    f.render_stateful_widget(list, area, &mut state);
    state.offset()
}

/// Session index under a pointer row, given the offset of the last render
pub fn index_at_row(area: Rect, row: u16, offset: usize, len: usize) -> Option<usize> {
    let top = area.y + 1;
    let bottom = area.bottom().saturating_sub(1);
    if row < top || row >= bottom {
        return None;
    }
    let index = offset + usize::from((row - top) / ROWS_PER_SESSION);
    (index < len).then_some(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_map_to_sessions_inside_the_border() {
        let area = Rect::new(0, 0, 30, 12);
        assert_eq!(index_at_row(area, 0, 0, 3), None);
        assert_eq!(index_at_row(area, 1, 0, 3), Some(0));
        assert_eq!(index_at_row(area, 2, 0, 3), Some(0));
        assert_eq!(index_at_row(area, 3, 0, 3), Some(1));
        assert_eq!(index_at_row(area, 5, 0, 3), Some(2));
        assert_eq!(index_at_row(area, 7, 0, 3), None);
        assert_eq!(index_at_row(area, 11, 0, 3), None);
    }

    #[test]
    fn scroll_offset_shifts_the_mapping() {
        let area = Rect::new(0, 2, 30, 6);
        assert_eq!(index_at_row(area, 3, 4, 10), Some(4));
        assert_eq!(index_at_row(area, 5, 4, 10), Some(5));
    }
}
