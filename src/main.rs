// chat-shell - terminal chat client with persistent sessions
//
// Holds a collection of independent conversations, tracks which one is
// active, and persists appearance/layout settings across restarts.
//
// Architecture:
// - Store: single owner of sessions, config and UI flags; publishes snapshots
// - Persistence: background writer subscribed to store snapshots
// - TUI (ratatui): renders snapshots, turns input into store operations
// - Collaborators: chat-completions and registration services over HTTP

mod cli;
mod collab;
mod config;
mod deferred;
mod drag;
mod hydration;
mod logging;
mod model;
mod persistence;
mod startup;
mod store;
mod supervisor;
mod theme;
mod tui;
mod util;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use config::Config;
use deferred::Deferred;
use logging::LogBuffer;
use persistence::{JsonFileStorage, PersistenceWriter};
use store::Store;
use tui::app::Services;
use tui::components::SettingsInfo;
use tui::TuiSetup;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Subcommands (config/state management) run to completion and exit
    if let Some(command) = cli.command {
        return cli::run_command(command);
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let mut config = Config::from_env();
    if cli.headless {
        config.enable_tui = false;
    }

    // In TUI mode logs go to the buffer (keeps the display intact);
    // the guard keeps the file writer flushing until main returns
    let log_buffer = LogBuffer::new();
    let _file_guard = logging::init(
        &config.logging,
        &config.log_dir(),
        config.enable_tui,
        &log_buffer,
    );

    let storage = JsonFileStorage::new(config.state_path.clone());
    let state = persistence::load_or_default(&storage);

    if config.enable_tui {
        startup::log_startup(&config, &state);
    } else {
        startup::print_startup(&config);
    }

    let store = Store::from_persisted(state);

    // Persists every snapshot whose durable part changed; ends when the
    // store is dropped
    let writer = PersistenceWriter::new(Box::new(storage), store.subscribe());
    let writer_handle = tokio::spawn(writer.run());

    let result = if config.enable_tui {
        let setup = TuiSetup {
            store,
            preference: theme::detect_color_scheme(config.color_scheme.as_deref()),
            log_buffer,
            services: Services::from_config(&config),
            settings_info: Deferred::spawn("settings info", SettingsInfo::gather(config.clone())),
        };
        tui::run_tui(setup).await
    } else {
        print!("{}", cli::summarize_state(&store.persisted_state()));
        tracing::info!("Headless run complete");
        drop(store);
        Ok(())
    };

    if let Err(e) = writer_handle.await {
        tracing::warn!("Persistence writer did not finish cleanly: {}", e);
    }

    result
}
