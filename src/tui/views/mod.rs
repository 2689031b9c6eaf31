// Views module - frame-level rendering
//
// Decides between the pre-hydration placeholder and the interactive shell,
// computes the responsive layout, and draws each subtree through its
// boundary so a panic in one pane leaves the others on screen.

use super::app::App;
use super::components::{chat, fallback, sidebar, status_bar};
use super::layout::{MainPane, ShellLayout};
use crate::hydration::{GateView, HydrationGate};
use crate::supervisor::SubtreeBoundary;
use crate::theme::Palette;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::Frame;

/// Main UI render function - called on every frame
pub fn draw(f: &mut Frame, app: &mut App) {
    let area = f.area();
    let snapshot = app.store.snapshot();

    // Nothing config- or session-dependent until the first frame has landed
    if HydrationGate::view(&snapshot) == GateView::Placeholder {
        fallback::placeholder(f, area);
        return;
    }

    let palette = app.palette.clone();
    f.render_widget(Block::default().style(Style::default().bg(palette.background)), area);

    let layout = ShellLayout::compute(area, &snapshot);
    app.layout = Some(layout);

    if let Some(rect) = layout.sidebar {
        let view = sidebar::SidebarView {
            snapshot: &snapshot,
            pending: &app.pending_replies,
            dragging: app.drag.is_dragging(),
            palette: &palette,
        };
        let mut offset = app.sidebar_offset;
        guarded(&mut app.boundaries.sidebar, f, rect, &palette, |f| {
            offset = sidebar::render(f, rect, view)
        });
        app.sidebar_offset = offset;
    }

    match layout.main {
        Some((MainPane::Chat, rect)) => {
            let view = chat::ChatView {
                snapshot: &snapshot,
                composer: &app.composer,
                awaiting_reply: app
                    .pending_replies
                    .contains(&snapshot.active_session().id),
                submit_key: snapshot.config.submit_key,
                palette: &palette,
            };
            guarded(&mut app.boundaries.chat, f, rect, &palette, |f| {
                chat::render(f, rect, view)
            });
        }
        Some((MainPane::Settings, rect)) => {
            let panel = &app.settings;
            let info = &app.settings_info;
            guarded(&mut app.boundaries.settings, f, rect, &palette, |f| {
                panel.render(f, rect, &snapshot.config, info, &palette)
            });
        }
        None => {}
    }

    let status = status_bar::StatusView {
        snapshot: &snapshot,
        notable: app.log_buffer.latest_notable(),
        pending_replies: app.pending_replies.len(),
        palette: &palette,
    };
    guarded(&mut app.boundaries.status, f, layout.status, &palette, |f| {
        status_bar::render(f, layout.status, status)
    });

    if let Some(form) = &app.register_form {
        form.render(f, area, &palette);
    }
    if let Some(toast) = &app.toast {
        toast.render(f, area, &palette);
    }
}

/// Draw `body` through `boundary`, or the fallback once it has faulted
fn guarded(
    boundary: &mut SubtreeBoundary,
    f: &mut Frame,
    area: Rect,
    palette: &Palette,
    body: impl FnOnce(&mut Frame),
) {
    if boundary.run(|| body(f)).is_none() {
        fallback::faulted(f, area, boundary.name(), palette);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deferred::Deferred;
    use crate::logging::LogBuffer;
    use crate::store::Store;
    use crate::theme::ColorScheme;
    use crate::tui::app::Services;
    use crate::tui::components::SettingsInfo;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use tokio::sync::mpsc;

    fn app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        let (info, _sender) = Deferred::<SettingsInfo>::channel();
        App::new(
            Store::new(),
            ColorScheme::Dark,
            LogBuffer::new(),
            Services::default(),
            info,
            tx,
        )
    }

    fn render(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for row in buffer.content.chunks(buffer.area.width as usize) {
            for cell in row {
                out.push_str(cell.symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn placeholder_until_first_frame() {
        let mut app = app();
        app.store.create_session();
        let screen = render(&mut app, 100, 20);
        assert!(screen.contains(fallback::PLACEHOLDER_TEXT));
        assert!(!screen.contains("Conversations"));
        assert!(app.layout.is_none());

        app.on_frame_drawn();
        let screen = render(&mut app, 100, 20);
        assert!(screen.contains("Conversations (2)"));
        assert!(app.layout.is_some());
    }

    #[test]
    fn settings_pane_shows_loading_about_block() {
        let mut app = app();
        app.on_frame_drawn();
        app.store.set_settings_open(true);
        let screen = render(&mut app, 120, 30);
        assert!(screen.contains("Settings"));
        assert!(screen.contains("Sidebar width"));
        assert!(screen.contains("Loading…"));
    }

    #[test]
    fn mobile_open_sidebar_hides_chat() {
        let mut app = app();
        app.on_frame_drawn();
        let screen = render(&mut app, 60, 20);
        assert!(screen.contains("Conversations (1)"));
        assert!(!screen.contains("to send"));

        app.store.set_sidebar_collapsed(true);
        let screen = render(&mut app, 60, 20);
        assert!(screen.contains("to send"));
    }

    #[test]
    fn faulted_subtree_renders_fallback_and_siblings_survive() {
        let mut app = app();
        app.on_frame_drawn();
        let palette = app.palette.clone();

        let mut terminal = Terminal::new(TestBackend::new(40, 6)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                guarded(&mut app.boundaries.chat, f, area, &palette, |_| {
                    panic!("chat exploded")
                });
            })
            .unwrap();
        assert!(app.boundaries.chat.is_faulted());

        let screen = render(&mut app, 120, 30);
        assert!(screen.contains("chat unavailable"));
        assert!(screen.contains("Conversations (1)"));

        app.boundaries.reset_all();
        let screen = render(&mut app, 120, 30);
        assert!(!screen.contains("chat unavailable"));
    }
}
