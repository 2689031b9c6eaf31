//! The `[logging]` section
//!
//! Log files live next to the state blob unless `file_dir` says otherwise,
//! so moving `state_path` moves the logs with it. A relative `file_dir` is
//! taken relative to the state directory.

use super::env;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Subdirectory of the state directory used when `file_dir` is unset
const LOG_SUBDIR: &str = "logs";

/// Rotation period for the rolling log file
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    /// One file for every run
    Never,
}

impl LogRotation {
    /// Unknown values fall back to daily
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "hourly" => Self::Hourly,
            "never" => Self::Never,
            _ => Self::Daily,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Never => "never",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Filter for this crate's records (RUST_LOG replaces it entirely)
    pub level: String,
    /// Also write JSON lines to a rolling file
    pub file_enabled: bool,
    /// Explicit log directory; `None` means `<state dir>/logs`
    pub file_dir: Option<PathBuf>,
    pub file_rotation: LogRotation,
    /// File name prefix ("chat-shell" -> "chat-shell.2026-10-18")
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: false,
            file_dir: None,
            file_rotation: LogRotation::Daily,
            file_prefix: "chat-shell".to_string(),
        }
    }
}

/// `[logging]` as written in the config file
#[derive(Debug, Deserialize, Default)]
pub struct FileLogging {
    pub level: Option<String>,
    pub file_enabled: Option<bool>,
    pub file_dir: Option<String>,
    pub file_rotation: Option<String>,
    pub file_prefix: Option<String>,
}

impl LoggingConfig {
    /// Merge env > file > defaults
    pub(crate) fn resolve(
        file: Option<FileLogging>,
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let level = non_empty(env::LOG_LEVEL)
            .or(file.level)
            .map(|level| level.trim().to_string())
            .unwrap_or(defaults.level);

        let file_enabled = non_empty(env::LOG_FILE)
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .or(file.file_enabled)
            .unwrap_or(defaults.file_enabled);

        // Setting a directory in the environment implies file logging
        let env_dir = non_empty(env::LOG_DIR);
        let file_enabled = file_enabled || env_dir.is_some();
        let file_dir = env_dir
            .or(file.file_dir)
            .filter(|dir| !dir.trim().is_empty())
            .map(|dir| super::expand_home(dir.trim()));

        Self {
            level,
            file_enabled,
            file_dir,
            file_rotation: file
                .file_rotation
                .map(|s| LogRotation::parse(&s))
                .unwrap_or(defaults.file_rotation),
            file_prefix: file
                .file_prefix
                .filter(|prefix| !prefix.trim().is_empty())
                .unwrap_or(defaults.file_prefix),
        }
    }

    /// Directory the rolling file is written to
    pub fn log_dir(&self, state_path: &Path) -> PathBuf {
        let state_dir = state_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        match &self.file_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => state_dir.join(dir),
            None => state_dir.join(LOG_SUBDIR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logs_default_to_the_state_directory() {
        let config = LoggingConfig::default();
        assert_eq!(
            config.log_dir(Path::new("/var/chat/state.json")),
            PathBuf::from("/var/chat/logs")
        );
        assert_eq!(config.log_dir(Path::new("state.json")), PathBuf::from("./logs"));
    }

    #[test]
    fn relative_dir_is_under_the_state_directory() {
        let config = LoggingConfig {
            file_dir: Some(PathBuf::from("trace")),
            ..LoggingConfig::default()
        };
        assert_eq!(
            config.log_dir(Path::new("/var/chat/state.json")),
            PathBuf::from("/var/chat/trace")
        );

        let config = LoggingConfig {
            file_dir: Some(PathBuf::from("/tmp/chat-logs")),
            ..LoggingConfig::default()
        };
        assert_eq!(
            config.log_dir(Path::new("/var/chat/state.json")),
            PathBuf::from("/tmp/chat-logs")
        );
    }

    #[test]
    fn env_dir_turns_file_logging_on() {
        let lookup = |key: &str| (key == env::LOG_DIR).then(|| "/tmp/chat-logs".to_string());
        let config = LoggingConfig::resolve(None, &lookup);
        assert!(config.file_enabled);
        assert_eq!(config.file_dir, Some(PathBuf::from("/tmp/chat-logs")));
    }

    #[test]
    fn env_level_and_switch_beat_the_file() {
        let file = FileLogging {
            level: Some("warn".to_string()),
            file_enabled: Some(true),
            ..FileLogging::default()
        };
        let lookup = |key: &str| match key {
            k if k == env::LOG_LEVEL => Some("debug".to_string()),
            k if k == env::LOG_FILE => Some("false".to_string()),
            _ => None,
        };
        let config = LoggingConfig::resolve(Some(file), &lookup);
        assert_eq!(config.level, "debug");
        assert!(!config.file_enabled);
    }
}
