//! Stand-ins drawn when the real content is not available
//!
//! `placeholder` is the pre-hydration frame: it reads nothing from the store
//! and uses only terminal default colors. `faulted` replaces a subtree whose
//! boundary caught a panic.

use crate::theme::Palette;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub const PLACEHOLDER_TEXT: &str = "Loading…";

/// Neutral loading frame
pub fn placeholder(f: &mut Frame, area: Rect) {
    let y = area.y + area.height / 2;
    let line = Rect::new(area.x, y.min(area.bottom().saturating_sub(1)), area.width, 1);
    f.render_widget(
        Paragraph::new(PLACEHOLDER_TEXT)
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::DIM)),
        line,
    );
}

/// Local fallback for a faulted subtree
pub fn faulted(f: &mut Frame, area: Rect, name: &str, palette: &Palette) {
    // The failed render may have left half a widget behind
    f.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(palette.border_type)
        .border_style(Style::default().fg(palette.error));
    let text = vec![
        Line::styled(
            format!("{} unavailable", name),
            Style::default().fg(palette.error).add_modifier(Modifier::BOLD),
        ),
        Line::styled("Press F5 to retry", Style::default().fg(palette.muted)),
    ];
    f.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
        area,
    );
}
