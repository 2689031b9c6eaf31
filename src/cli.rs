// CLI module - command-line argument parsing and handlers
//
// Subcommands for the two files the shell owns:
// - config: startup configuration (config.toml)
// - state: persisted conversations and appearance settings (state.json)

use crate::config::{Config, VERSION};
use crate::persistence::{JsonFileStorage, PersistedState, StateStorage};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::Path;
use std::process::Command;

/// chat-shell - terminal chat client with persistent sessions
#[derive(Parser)]
#[command(name = "chat-shell")]
#[command(version = VERSION)]
#[command(about = "Terminal chat client with persistent sessions", long_about = None)]
pub struct Cli {
    /// Load state, log a summary and exit without starting the interface
    #[arg(long, global = true)]
    pub headless: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage startup configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(long)]
        edit: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,

        /// Don't ask before overwriting
        #[arg(long, short)]
        yes: bool,
    },

    /// Inspect or reset saved conversations and appearance settings
    State {
        /// Summarize the saved state
        #[arg(long)]
        show: bool,

        /// Show state file path
        #[arg(long)]
        path: bool,

        /// Discard all conversations and settings
        #[arg(long)]
        reset: bool,

        /// Don't ask before discarding
        #[arg(long, short)]
        yes: bool,
    },
}

/// Run a subcommand to completion
pub fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Config {
            show,
            reset,
            edit,
            path,
            yes,
        } => {
            if path {
                handle_config_path()
            } else if show {
                handle_config_show();
                Ok(())
            } else if reset {
                handle_config_reset(yes)
            } else if edit {
                handle_config_edit()
            } else {
                println!("Usage: chat-shell config [--show|--reset|--edit|--path]");
                println!();
                println!("Options:");
                println!("  --show    Display effective configuration");
                println!("  --reset   Reset config file to defaults");
                println!("  --edit    Open config file in $EDITOR");
                println!("  --path    Show config file path");
                Ok(())
            }
        }
        Commands::State {
            show,
            path,
            reset,
            yes,
        } => {
            let config = Config::from_env();
            if path {
                println!("{}", config.state_path.display());
                Ok(())
            } else if show {
                handle_state_show(&config.state_path)
            } else if reset {
                handle_state_reset(&config.state_path, yes)
            } else {
                println!("Usage: chat-shell state [--show|--path|--reset]");
                println!();
                println!("Options:");
                println!("  --show    Summarize saved conversations and settings");
                println!("  --path    Show state file path");
                println!("  --reset   Discard all conversations and settings");
                Ok(())
            }
        }
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{} [y/N] ", prompt);
    std::io::stderr().flush()?;

    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .context("Failed to read confirmation")?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn handle_config_path() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;
    println!("{}", path.display());
    Ok(())
}

fn handle_config_show() {
    let config = Config::from_env();

    println!("# Effective configuration (env > file > defaults)");
    println!();
    println!("state_path = {:?}", config.state_path.display().to_string());
    println!("api_url = {:?}", config.api_url);
    println!("api_model = {:?}", config.api_model);
    println!(
        "api_key = {}",
        if config.api_key.is_some() {
            "(set via environment)"
        } else {
            "(unset)"
        }
    );
    match &config.registration_url {
        Some(url) => println!("registration_url = {:?}", url),
        None => println!("# registration_url unset (registration disabled)"),
    }
    match &config.color_scheme {
        Some(scheme) => println!("color_scheme = {:?}", scheme),
        None => println!("# color_scheme unset (detected from terminal)"),
    }
    println!("enable_tui = {}", config.enable_tui);
    println!();
    println!("[logging]");
    println!("level = {:?}", config.logging.level);
    println!("file_enabled = {}", config.logging.file_enabled);
    println!(
        "file_dir = {:?}",
        config.log_dir().display().to_string()
    );
    println!("file_rotation = {:?}", config.logging.file_rotation.as_str());
    println!("file_prefix = {:?}", config.logging.file_prefix);

    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}

fn handle_config_reset(yes: bool) -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    if path.exists()
        && !yes
        && !confirm(&format!(
            "Config file exists at {}. Overwrite?",
            path.display()
        ))?
    {
        println!("Aborted.");
        return Ok(());
    }

    Config::default()
        .save()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Config reset to defaults: {}", path.display());
    Ok(())
}

fn handle_config_edit() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    if !path.exists() {
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
    }

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });

    println!("Opening {} with {}", path.display(), editor);

    let status = Command::new(&editor)
        .arg(&path)
        .status()
        .with_context(|| {
            format!(
                "Failed to launch editor '{}'; set $EDITOR to your preferred editor",
                editor
            )
        })?;
    if !status.success() {
        bail!("Editor exited with status: {}", status);
    }
    Ok(())
}

fn handle_state_show(path: &Path) -> Result<()> {
    let storage = JsonFileStorage::new(path);
    let Some(state) = storage
        .load()
        .with_context(|| format!("Failed to load {}", path.display()))?
    else {
        println!("# No saved state at {}", path.display());
        return Ok(());
    };

    println!("# Saved state: {}", path.display());
    println!();
    println!("{}", summarize_state(&state));
    Ok(())
}

fn handle_state_reset(path: &Path, yes: bool) -> Result<()> {
    if path.exists()
        && !yes
        && !confirm(&format!(
            "Discard all conversations saved in {}?",
            path.display()
        ))?
    {
        println!("Aborted.");
        return Ok(());
    }

    let mut storage = JsonFileStorage::new(path);
    storage
        .save(&PersistedState::default())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("State reset: {}", path.display());
    Ok(())
}

/// Human-readable summary used by `state --show`
pub fn summarize_state(state: &PersistedState) -> String {
    let mut out = String::new();
    out.push_str(&format!("theme = {}\n", state.config.theme.as_str()));
    out.push_str(&format!("tight_border = {}\n", state.config.tight_border));
    out.push_str(&format!("sidebar_width = {}\n", state.config.sidebar_width));
    out.push_str(&format!("submit_key = {}\n", state.config.submit_key.label()));
    out.push('\n');
    out.push_str(&format!("{} session(s)\n", state.sessions.len()));
    for (index, session) in state.sessions.iter().enumerate() {
        let marker = if index == state.active_index { '*' } else { ' ' };
        out.push_str(&format!(
            "{} {:>3}  {}  ({} messages, updated {})\n",
            marker,
            index,
            session.title,
            session.messages.len(),
            session.last_updated_at.format("%Y-%m-%d %H:%M"),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_state_subcommand_and_global_headless() {
        let cli = Cli::try_parse_from(["chat-shell", "state", "--show", "--headless"]).unwrap();
        assert!(cli.headless);
        assert!(matches!(
            cli.command,
            Some(Commands::State { show: true, .. })
        ));
    }

    #[test]
    fn summary_marks_active_session() {
        let mut state = PersistedState::default();
        state.sessions.push(crate::model::Session::new());
        state.sessions[1].title = "Second".to_string();
        state.active_index = 1;

        let summary = summarize_state(&state);
        assert!(summary.contains("2 session(s)"));
        assert!(summary.contains("*   1  Second"));
        assert!(summary.contains("submit_key = Ctrl + Enter"));
    }
}
