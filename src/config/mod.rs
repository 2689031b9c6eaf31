//! Startup configuration for the shell
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/chat-shell/config.toml)
//! 3. Built-in defaults (lowest priority)
//!
//! This is process configuration (where state lives, which endpoints to
//! talk to, how to log). The user-adjustable appearance settings live in
//! the persisted state blob, not here.

use serde::Deserialize;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod observability;
mod serialization;

#[cfg(test)]
mod tests;

pub use observability::{FileLogging, LogRotation, LoggingConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Directory name under ~/.config
const APP_DIR: &str = "chat-shell";

const DEFAULT_API_URL: &str = "http://localhost:11434";
const DEFAULT_API_MODEL: &str = "llama3.2";

/// Environment variable names
pub mod env {
    pub const STATE_PATH: &str = "CHAT_SHELL_STATE_PATH";
    pub const API_URL: &str = "CHAT_SHELL_API_URL";
    pub const API_MODEL: &str = "CHAT_SHELL_MODEL";
    pub const API_KEY: &str = "CHAT_SHELL_API_KEY";
    pub const REGISTRATION_URL: &str = "CHAT_SHELL_REGISTRATION_URL";
    pub const COLOR_SCHEME: &str = crate::theme::COLOR_SCHEME_ENV;
    pub const NO_TUI: &str = "CHAT_SHELL_NO_TUI";
    pub const LOG_LEVEL: &str = "CHAT_SHELL_LOG_LEVEL";
    pub const LOG_FILE: &str = "CHAT_SHELL_LOG_FILE";
    pub const LOG_DIR: &str = "CHAT_SHELL_LOG_DIR";
}

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Where the persisted state blob lives
    pub state_path: PathBuf,

    /// Base URL of the OpenAI-compatible chat-completions service
    pub api_url: String,

    /// Model name sent with every completion request
    pub api_model: String,

    /// Bearer token for the completions service (env only, never written)
    pub api_key: Option<String>,

    /// Base URL of the registration service; registration is off when unset
    pub registration_url: Option<String>,

    /// Forced color-scheme preference: "light" or "dark" (detected when unset)
    pub color_scheme: Option<String>,

    /// Whether to run the terminal interface (false = headless smoke run)
    pub enable_tui: bool,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_path: Self::default_state_path(),
            api_url: DEFAULT_API_URL.to_string(),
            api_model: DEFAULT_API_MODEL.to_string(),
            api_key: None,
            registration_url: None,
            color_scheme: None,
            enable_tui: true,
            logging: LoggingConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure (subset of Config that makes sense to persist)
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub state_path: Option<String>,
    pub api_url: Option<String>,
    pub api_model: Option<String>,
    pub registration_url: Option<String>,
    pub color_scheme: Option<String>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// ~/.config/chat-shell
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join(APP_DIR))
    }

    /// Get the config file path: ~/.config/chat-shell/config.toml
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.toml"))
    }

    /// ~/.config/chat-shell/state.json, or ./state.json without a home dir
    pub fn default_state_path() -> PathBuf {
        Self::config_dir()
            .map(|p| p.join("state.json"))
            .unwrap_or_else(|| PathBuf::from("state.json"))
    }

    /// Create config file with defaults if it doesn't exist
    /// Called during startup to help users discover configuration options
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Config is optional
            }
        }

        // Config::default().to_toml() is the single source of truth
        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Load file config if it exists
    ///
    /// Exits the process if the file exists but cannot be read or parsed:
    /// a broken config should fail fast, not silently fall back to defaults
    /// while the user debugs the wrong thing.
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("\n  CONFIG ERROR - Failed to parse configuration file\n");
                    eprintln!("  File: {}\n", path.display());
                    eprintln!("  Error: {}\n", e);
                    eprintln!("  Tip: Check for:\n");
                    eprintln!("    - Missing quotes around string values");
                    eprintln!("    - Invalid boolean values (use true/false)");
                    eprintln!("    - Typos in section names\n");
                    eprintln!("  To reset, run `chat-shell config --reset`.\n");
                    std::process::exit(1);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(e) => {
                eprintln!("\n  CONFIG ERROR - Cannot read configuration file\n");
                eprintln!("  File: {}\n", path.display());
                eprintln!("  Error: {}\n", e);
                std::process::exit(1);
            }
        }
    }

    /// Load configuration: env vars > file > defaults
    pub fn from_env() -> Self {
        let file = Self::load_file_config();
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merge a parsed file with an environment lookup
    pub(crate) fn resolve(file: FileConfig, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // State path: env > file > default
        let state_path = non_empty(env::STATE_PATH)
            .or(file.state_path)
            .map(|p| expand_home(&p))
            .unwrap_or(defaults.state_path);

        let api_url = non_empty(env::API_URL)
            .or(file.api_url)
            .unwrap_or(defaults.api_url);

        let api_model = non_empty(env::API_MODEL)
            .or(file.api_model)
            .unwrap_or(defaults.api_model);

        // API key: env only
        let api_key = non_empty(env::API_KEY);

        let registration_url = non_empty(env::REGISTRATION_URL)
            .or(file.registration_url)
            .filter(|url| !url.trim().is_empty());

        let color_scheme = non_empty(env::COLOR_SCHEME).or(file.color_scheme);

        // TUI toggle: env only (runtime flag)
        let enable_tui = lookup(env::NO_TUI)
            .map(|v| v != "1" && v.to_lowercase() != "true")
            .unwrap_or(true);

        let logging = LoggingConfig::resolve(file.logging, &lookup);

        Self {
            state_path,
            api_url,
            api_model,
            api_key,
            registration_url,
            color_scheme,
            enable_tui,
            logging,
        }
    }

    /// Where the rolling log file goes
    pub fn log_dir(&self) -> PathBuf {
        self.logging.log_dir(&self.state_path)
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
