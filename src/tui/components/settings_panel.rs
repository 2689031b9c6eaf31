//! Settings panel component
//!
//! Owns the settings pane's own state (which row is selected) and renders
//! the current `ShellConfig`. Every change goes back through the store.
//! The "About" block at the bottom is a deferred module: it touches the
//! filesystem, so it is gathered off the event loop.

use crate::config::{Config, VERSION};
use crate::deferred::Deferred;
use crate::model::ShellConfig;
use crate::theme::Palette;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::path::PathBuf;

/// One row of the settings pane, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsRow {
    Theme,
    SubmitKey,
    TightBorder,
    SidebarWidth,
    ResetSettings,
    ClearConversations,
    Register,
}

impl SettingsRow {
    pub const ALL: [SettingsRow; 7] = [
        SettingsRow::Theme,
        SettingsRow::SubmitKey,
        SettingsRow::TightBorder,
        SettingsRow::SidebarWidth,
        SettingsRow::ResetSettings,
        SettingsRow::ClearConversations,
        SettingsRow::Register,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SettingsRow::Theme => "Theme",
            SettingsRow::SubmitKey => "Send key",
            SettingsRow::TightBorder => "Tight border",
            SettingsRow::SidebarWidth => "Sidebar width",
            SettingsRow::ResetSettings => "Reset settings",
            SettingsRow::ClearConversations => "Clear all conversations",
            SettingsRow::Register => "Register an account",
        }
    }

    /// Current value column, empty for action rows
    pub fn value(&self, config: &ShellConfig) -> String {
        match self {
            SettingsRow::Theme => config.theme.as_str().to_string(),
            SettingsRow::SubmitKey => config.submit_key.label().to_string(),
            SettingsRow::TightBorder => {
                if config.tight_border { "on" } else { "off" }.to_string()
            }
            SettingsRow::SidebarWidth => format!("{:.0}", config.sidebar_width),
            SettingsRow::ResetSettings
            | SettingsRow::ClearConversations
            | SettingsRow::Register => String::new(),
        }
    }
}

/// Environment facts shown under the options
#[derive(Debug, Clone)]
pub struct SettingsInfo {
    pub version: &'static str,
    pub config_path: Option<PathBuf>,
    pub config_exists: bool,
    pub state_path: PathBuf,
    pub state_bytes: Option<u64>,
    pub api_url: String,
    pub api_model: String,
    pub registration_enabled: bool,
}

impl SettingsInfo {
    /// Collect the info block; reads file metadata
    pub async fn gather(config: Config) -> Self {
        let config_path = Config::config_path();
        let config_exists = match &config_path {
            Some(path) => tokio::fs::metadata(path).await.is_ok(),
            None => false,
        };
        let state_bytes = tokio::fs::metadata(&config.state_path)
            .await
            .ok()
            .map(|m| m.len());

        Self {
            version: VERSION,
            config_path,
            config_exists,
            state_path: config.state_path,
            state_bytes,
            api_url: config.api_url,
            api_model: config.api_model,
            registration_enabled: config.registration_url.is_some(),
        }
    }

    fn lines(&self) -> Vec<String> {
        let config_line = match &self.config_path {
            Some(path) if self.config_exists => format!("Config   {}", path.display()),
            Some(path) => format!("Config   {} (defaults)", path.display()),
            None => "Config   (no home directory)".to_string(),
        };
        let state_line = match self.state_bytes {
            Some(bytes) => format!("State    {} ({} bytes)", self.state_path.display(), bytes),
            None => format!("State    {} (not saved yet)", self.state_path.display()),
        };
        vec![
            format!("chat-shell v{}", self.version),
            config_line,
            state_line,
            format!("Model    {} @ {}", self.api_model, self.api_url),
            format!(
                "Account  registration {}",
                if self.registration_enabled { "available" } else { "not configured" }
            ),
        ]
    }
}

/// Settings pane state
#[derive(Debug, Default)]
pub struct SettingsPanel {
    pub selected: usize,
}

impl SettingsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_row(&self) -> SettingsRow {
        SettingsRow::ALL[self.selected.min(SettingsRow::ALL.len() - 1)]
    }

    /// Move selection, stopping at both ends
    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1).min(SettingsRow::ALL.len() - 1);
    }

    pub fn render(
        &self,
        f: &mut Frame,
        area: Rect,
        config: &ShellConfig,
        info: &Deferred<SettingsInfo>,
        palette: &Palette,
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(palette.border_type)
            .border_style(Style::default().fg(palette.border_focused))
            .title(" Settings ")
            .title_style(Style::default().fg(palette.foreground).add_modifier(Modifier::BOLD));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(SettingsRow::ALL.len() as u16 + 1),
                Constraint::Min(0),
            ])
            .split(inner);

        let label_width = SettingsRow::ALL
            .iter()
            .map(|row| row.label().len())
            .max()
            .unwrap_or(0);

        let lines: Vec<Line> = SettingsRow::ALL
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let selected = i == self.selected;
                let marker = if selected { "▸ " } else { "  " };
                let style = if selected {
                    Style::default()
                        .fg(palette.foreground)
                        .bg(palette.selection)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(palette.foreground)
                };
                Line::from(vec![
                    Span::styled(
                        format!("{marker}{:<width$}  ", row.label(), width = label_width),
                        style,
                    ),
                    Span::styled(row.value(config), Style::default().fg(palette.assistant)),
                ])
            })
            .collect();
        f.render_widget(Paragraph::new(lines), chunks[0]);

        let about: Vec<Line> = match info.get() {
            Some(info) => info
                .lines()
                .into_iter()
                .map(|l| Line::styled(l, Style::default().fg(palette.muted)))
                .collect(),
            None => vec![Line::styled(
                "Loading…",
                Style::default().fg(palette.muted),
            )],
        };
        let about_block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(palette.border))
            .title(" About ");
        f.render_widget(Paragraph::new(about).block(about_block), chunks[1]);
    }
}
