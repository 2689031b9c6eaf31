//! Chat pane: message history of the active session plus the composer

use crate::model::{Role, SubmitKey};
use crate::store::Snapshot;
use crate::theme::Palette;
use crate::util::wrap_to_width;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Composer grows with its content up to this many text lines
const MAX_COMPOSER_LINES: usize = 6;

pub struct ChatView<'a> {
    pub snapshot: &'a Snapshot,
    pub composer: &'a str,
    pub awaiting_reply: bool,
    pub submit_key: SubmitKey,
    pub palette: &'a Palette,
}

pub fn render(f: &mut Frame, area: Rect, view: ChatView<'_>) {
    let text_width = area.width.saturating_sub(2) as usize;
    let composer_lines = wrap_to_width(view.composer, text_width.max(1));
    let composer_height = composer_lines.len().clamp(1, MAX_COMPOSER_LINES) as u16 + 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(composer_height)])
        .split(area);

    render_history(f, chunks[0], &view);
    render_composer(f, chunks[1], &view, composer_lines);
}

fn render_history(f: &mut Frame, area: Rect, view: &ChatView<'_>) {
    let palette = view.palette;
    let session = view.snapshot.active_session();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(palette.border_type)
        .border_style(Style::default().fg(palette.border))
        .title(format!(" {} ", session.title))
        .title_style(Style::default().fg(palette.foreground).add_modifier(Modifier::BOLD));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let width = inner.width as usize;
    let lines = history_lines(view, width);

    // Stick to the bottom: show the newest lines that fit
    let skip = lines.len().saturating_sub(inner.height as usize);
    let visible: Vec<Line> = lines.into_iter().skip(skip).collect();
    f.render_widget(Paragraph::new(visible), inner);
}

/// Wrapped, styled history lines for the active session
fn history_lines<'a>(view: &ChatView<'a>, width: usize) -> Vec<Line<'static>> {
    let palette = view.palette;
    let session = view.snapshot.active_session();

    if session.messages.is_empty() && !view.awaiting_reply {
        return vec![Line::styled(
            "No messages yet. Type below to start.",
            Style::default().fg(palette.muted),
        )];
    }

    let mut lines = Vec::new();
    for message in &session.messages {
        let (label, color) = match message.role {
            Role::User => ("You", palette.user),
            Role::Assistant => ("Assistant", palette.assistant),
            Role::System => ("System", palette.muted),
        };
        let mut header = vec![
            Span::styled(
                label.to_string(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", message.timestamp.format("%H:%M")),
                Style::default().fg(palette.muted),
            ),
        ];
        if message.streaming {
            header.push(Span::styled(
                "  ⋯",
                Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
            ));
        }
        lines.push(Line::from(header));
        for text in wrap_to_width(&message.content, width.max(1)) {
            lines.push(Line::styled(text, Style::default().fg(palette.foreground)));
        }
        lines.push(Line::default());
    }
    // Once fragments arrive the streaming message itself shows progress
    if view.awaiting_reply && session.streaming_position().is_none() {
        lines.push(Line::styled(
            "Assistant is replying…",
            Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
        ));
    }
    lines
}

fn render_composer(f: &mut Frame, area: Rect, view: &ChatView<'_>, lines: Vec<String>) {
    let palette = view.palette;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(palette.border_type)
        .border_style(Style::default().fg(palette.border_focused))
        .title(format!(" {} to send ", view.submit_key.label()))
        .title_style(Style::default().fg(palette.muted));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let skip = lines.len().saturating_sub(inner.height as usize);
    let mut text: Vec<Line> = lines
        .into_iter()
        .skip(skip)
        .map(|l| Line::styled(l, Style::default().fg(palette.foreground)))
        .collect();
    if view.composer.is_empty() {
        text = vec![Line::styled(
            "Message…",
            Style::default().fg(palette.muted),
        )];
    }
    f.render_widget(Paragraph::new(text), inner);
}
