/// Responsive shell layout for the terminal host.
///
/// Single source of truth for width thresholds and the width-unit mapping:
/// one terminal column is ten sidebar width units.
use crate::store::Snapshot;
use ratatui::layout::{Constraint, Direction, Layout, Margin, Rect};

/// Sidebar width units per terminal column
pub const UNITS_PER_COLUMN: f64 = 10.0;

/// Viewports narrower than this many width units are mobile
pub const MOBILE_BREAKPOINT: f64 = 768.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakpoint {
    /// Below 768 units (76 columns): one pane at a time, no chrome margin
    Mobile,
    Desktop,
}

impl Breakpoint {
    pub fn from_width(columns: u16) -> Self {
        if columns_to_units(columns) < MOBILE_BREAKPOINT {
            Breakpoint::Mobile
        } else {
            Breakpoint::Desktop
        }
    }
}

pub fn columns_to_units(columns: u16) -> f64 {
    f64::from(columns) * UNITS_PER_COLUMN
}

pub fn units_to_columns(units: f64) -> u16 {
    (units / UNITS_PER_COLUMN).round().clamp(0.0, f64::from(u16::MAX)) as u16
}

/// Which pane fills the main area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainPane {
    Chat,
    Settings,
}

/// Computed regions for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellLayout {
    pub breakpoint: Breakpoint,
    pub sidebar: Option<Rect>,
    /// Column of the sidebar's draggable right edge
    pub drag_handle: Option<u16>,
    pub main: Option<(MainPane, Rect)>,
    pub status: Rect,
}

impl ShellLayout {
    pub fn compute(area: Rect, snapshot: &Snapshot) -> Self {
        let breakpoint = Breakpoint::from_width(area.width);
        let [body, status] = split_status(area);

        let pane = if snapshot.settings_open {
            MainPane::Settings
        } else {
            MainPane::Chat
        };

        match breakpoint {
            Breakpoint::Mobile => {
                // One pane at a time; the open sidebar covers everything
                if snapshot.sidebar_collapsed {
                    Self {
                        breakpoint,
                        sidebar: None,
                        drag_handle: None,
                        main: Some((pane, body)),
                        status,
                    }
                } else {
                    Self {
                        breakpoint,
                        sidebar: Some(body),
                        drag_handle: None,
                        main: None,
                        status,
                    }
                }
            }
            Breakpoint::Desktop => {
                let shell = if snapshot.config.tight_border {
                    body
                } else {
                    body.inner(Margin::new(1, 0))
                };

                if snapshot.sidebar_collapsed {
                    return Self {
                        breakpoint,
                        sidebar: None,
                        drag_handle: None,
                        main: Some((pane, shell)),
                        status,
                    };
                }

                // Leave the main pane at least a sliver
                let wanted = units_to_columns(snapshot.config.sidebar_width);
                let sidebar_cols = wanted.min(shell.width.saturating_sub(10)).max(1);
                let chunks = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Length(sidebar_cols), Constraint::Min(0)])
                    .split(shell);

                Self {
                    breakpoint,
                    sidebar: Some(chunks[0]),
                    drag_handle: Some(chunks[0].right().saturating_sub(1)),
                    main: Some((pane, chunks[1])),
                    status,
                }
            }
        }
    }

    pub fn is_mobile(&self) -> bool {
        self.breakpoint == Breakpoint::Mobile
    }

    /// Whether a pointer at (column, row) sits on the drag handle
    pub fn on_drag_handle(&self, column: u16, row: u16) -> bool {
        match (self.drag_handle, self.sidebar) {
            (Some(x), Some(sidebar)) => column == x && row >= sidebar.y && row < sidebar.bottom(),
            _ => false,
        }
    }
}

fn split_status(area: Rect) -> [Rect; 2] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    [chunks[0], chunks[1]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    #[test]
    fn breakpoint_thresholds() {
        assert_eq!(Breakpoint::from_width(76), Breakpoint::Mobile);
        assert_eq!(Breakpoint::from_width(77), Breakpoint::Desktop);
        assert_eq!(Breakpoint::from_width(200), Breakpoint::Desktop);
    }

    #[test]
    fn desktop_sidebar_follows_configured_width() {
        let mut store = Store::new();
        store.update_config(|c| c.sidebar_width = 250.0);
        let layout = ShellLayout::compute(Rect::new(0, 0, 120, 40), &store.snapshot());

        let sidebar = layout.sidebar.unwrap();
        assert_eq!(sidebar.width, 25);
        // Default chrome leaves one column of margin
        assert_eq!(sidebar.x, 1);
        assert_eq!(layout.drag_handle, Some(25));
        assert!(layout.on_drag_handle(25, 5));
        assert!(!layout.on_drag_handle(24, 5));
        assert_eq!(layout.status.y, 39);
    }

    #[test]
    fn tight_border_drops_margin_on_desktop_only() {
        let mut store = Store::new();
        store.update_config(|c| c.tight_border = true);
        let desktop = ShellLayout::compute(Rect::new(0, 0, 120, 40), &store.snapshot());
        assert_eq!(desktop.sidebar.unwrap().x, 0);

        let mobile = ShellLayout::compute(Rect::new(0, 0, 60, 40), &store.snapshot());
        assert!(mobile.is_mobile());
        assert_eq!(mobile.sidebar.unwrap().width, 60);
        assert!(mobile.drag_handle.is_none());
    }

    #[test]
    fn collapsed_sidebar_gives_main_pane_everything() {
        let mut store = Store::new();
        store.set_sidebar_collapsed(true);
        store.set_settings_open(true);
        let layout = ShellLayout::compute(Rect::new(0, 0, 60, 20), &store.snapshot());
        assert!(layout.sidebar.is_none());
        let (pane, rect) = layout.main.unwrap();
        assert_eq!(pane, MainPane::Settings);
        assert_eq!(rect.width, 60);
    }
}
