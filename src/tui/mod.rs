// TUI module - Terminal User Interface
//
// This module hosts the shell in a terminal using ratatui. It handles:
// - Terminal initialization and cleanup
// - Event loop (keyboard/mouse input, timer ticks, collaborator results)
// - Signalling the hydration gate once a frame has actually been drawn

pub mod app;
pub mod components;
pub mod input;
pub mod layout;
pub mod views;

use crate::deferred::Deferred;
use crate::logging::LogBuffer;
use crate::store::Store;
use crate::theme::ColorScheme;
use anyhow::{Context, Result};
use app::{App, AppEvent, Services};
use components::SettingsInfo;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::panic;
use std::time::Duration;
use tokio::sync::mpsc;

/// Everything the terminal host needs to start
pub struct TuiSetup {
    pub store: Store,
    pub preference: ColorScheme,
    pub log_buffer: LogBuffer,
    pub services: Services,
    pub settings_info: Deferred<SettingsInfo>,
}

/// Run the TUI
///
/// Sets up the terminal, runs the event loop, and restores the terminal when
/// done. The store is dropped on return, which ends the persistence writer.
pub async fn run_tui(setup: TuiSetup) -> Result<()> {
    // Set up terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to setup terminal")?;

    // Needed to tell Ctrl+Enter from Enter; not every terminal can
    let enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )
        .context("Failed to enable keyboard enhancement")?;
    } else {
        tracing::warn!("Terminal cannot report modified Enter; use Settings to pick another send key");
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    // Panics inside subtree boundaries are recovered; keep them off the screen
    let previous_hook = panic::take_hook();
    panic::set_hook(Box::new(|info| {
        tracing::error!("Panic: {}", info);
    }));

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let mut app = App::new(
        setup.store,
        setup.preference,
        setup.log_buffer,
        setup.services,
        setup.settings_info,
        event_tx,
    );

    // Run the event loop
    let result = run_event_loop(&mut terminal, &mut app, &mut event_rx).await;

    let _ = panic::take_hook();
    panic::set_hook(previous_hook);

    // Restore terminal
    if enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)
            .context("Failed to restore keyboard mode")?;
    }
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
///
/// Waits on three sources with `tokio::select!`:
/// 1. Keyboard, mouse and resize input
/// 2. Timer ticks (deferred modules, toast expiry)
/// 3. Collaborator results from spawned tasks
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    event_rx: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(Duration::from_millis(200));

    loop {
        app.sync_presentation();
        terminal
            .draw(|f| views::draw(f, app))
            .context("Failed to draw terminal")?;
        app.on_frame_drawn();

        tokio::select! {
            _ = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key_event)) => app.handle_key(key_event),
                        Ok(Event::Mouse(mouse_event)) => app.handle_mouse(mouse_event),
                        Ok(Event::Resize(_, _)) => app.on_resize(),
                        _ => {}
                    }
                }
            } => {}

            _ = tick_interval.tick() => {
                app.tick();
            }

            Some(app_event) = event_rx.recv() => {
                app.handle_app_event(app_event);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
