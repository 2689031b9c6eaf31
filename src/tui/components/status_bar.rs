// Status bar component
//
// One line at the bottom: the latest warning/error from the log buffer when
// there is one, otherwise session count and key hints.

use crate::logging::LogEntry;
use crate::store::Snapshot;
use crate::theme::Palette;
use crate::tui::layout::Breakpoint;
use crate::util::truncate_to_width;
use ratatui::{layout::Rect, style::Style, widgets::Paragraph, Frame};

pub struct StatusView<'a> {
    pub snapshot: &'a Snapshot,
    pub notable: Option<LogEntry>,
    pub pending_replies: usize,
    pub palette: &'a Palette,
}

/// Render the status line
///
/// Narrow terminals get a compact form without key hints.
pub fn render(f: &mut Frame, area: Rect, view: StatusView<'_>) {
    let palette = view.palette;
    let text = status_text(&view, Breakpoint::from_width(area.width));
    let style = match view.notable {
        Some(_) => Style::default().fg(palette.error),
        None => Style::default().fg(palette.status_bar),
    };
    let line = truncate_to_width(&text, area.width as usize);
    f.render_widget(Paragraph::new(line).style(style), area);
}

fn status_text(view: &StatusView<'_>, breakpoint: Breakpoint) -> String {
    if let Some(entry) = &view.notable {
        return format!(" {} {}", entry.level.as_str(), entry.message);
    }

    let sessions = view.snapshot.sessions.len();
    let waiting = if view.pending_replies > 0 {
        format!(" │ ⋯ {}", view.pending_replies)
    } else {
        String::new()
    };

    match breakpoint {
        Breakpoint::Mobile => format!(" {} chats{} │ ^B list │ ^Q quit", sessions, waiting),
        Breakpoint::Desktop => format!(
            " {} conversation(s) │ rev {}{} │ ^N new  ^W close  ^B sidebar  F2 settings  ^T theme  ^Q quit",
            sessions, view.snapshot.revision, waiting
        ),
    }
}
