//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Serialize config to TOML string (single source of truth for format)
    ///
    /// The API key is never written; it only comes from the environment.
    pub fn to_toml(&self) -> String {
        format!(
            r#"# chat-shell configuration
#
# Environment variables override every value here (CHAT_SHELL_*).
# Appearance settings (theme, sidebar width, submit key) are changed inside
# the shell and saved with your conversations, not in this file.

# Where conversations and appearance settings are stored
state_path = "{state_path}"

# OpenAI-compatible chat completions service
# The API key is read from CHAT_SHELL_API_KEY only
api_url = "{api_url}"
api_model = "{api_model}"

# Registration service base URL (registration is disabled when unset)
{registration_url}
# Color-scheme preference used by the "auto" theme: "light" or "dark"
# Detected from the terminal when unset
{color_scheme}
# Logging configuration (RUST_LOG env var overrides)
[logging]
level = "{log_level}"
# File logging (in addition to the TUI buffer or stdout)
file_enabled = {log_file_enabled}
# Relative directories are resolved against the state directory
{log_file_dir}
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = "{log_file_prefix}"
"#,
            state_path = toml_path(&self.state_path),
            api_url = self.api_url,
            api_model = self.api_model,
            registration_url = optional_line(
                "registration_url",
                &self.registration_url,
                "https://example.com/api"
            ),
            color_scheme = optional_line("color_scheme", &self.color_scheme, "dark"),
            log_level = self.logging.level,
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = optional_line(
                "file_dir",
                &self.logging.file_dir.as_deref().map(toml_path),
                "logs"
            ),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = self.logging.file_prefix,
        )
    }

    /// Save current configuration to file
    pub fn save(&self) -> Result<(), std::io::Error> {
        let Some(path) = Self::config_path() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config path",
            ));
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, self.to_toml())
    }
}

/// Set value, or a commented-out example when unset
fn optional_line(key: &str, value: &Option<String>, example: &str) -> String {
    match value {
        Some(v) => format!("{} = \"{}\"\n", key, v),
        None => format!("# {} = \"{}\"\n", key, example),
    }
}

/// Paths use forward slashes so Windows backslashes don't become TOML escapes
fn toml_path(path: &std::path::Path) -> String {
    path.display().to_string().replace('\\', "/")
}
