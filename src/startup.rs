// Startup module - banner and startup summary
//
// Headless runs print a banner to stdout; the terminal shell logs the same
// facts through tracing so they land in the log buffer and log file.

use crate::config::{Config, VERSION};
use crate::persistence::PersistedState;

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
}

/// One line of the startup summary
pub struct StartupItem {
    pub name: &'static str,
    pub enabled: bool,
    pub detail: String,
}

/// What this run is wired to
pub fn startup_items(config: &Config) -> Vec<StartupItem> {
    vec![
        StartupItem {
            name: "state",
            enabled: true,
            detail: config.state_path.display().to_string(),
        },
        StartupItem {
            name: "compose",
            enabled: true,
            detail: format!("{} @ {}", config.api_model, config.api_url),
        },
        StartupItem {
            name: "register",
            enabled: config.registration_url.is_some(),
            detail: config
                .registration_url
                .clone()
                .unwrap_or_else(|| "not configured".to_string()),
        },
        StartupItem {
            name: "file log",
            enabled: config.logging.file_enabled,
            detail: config.log_dir().display().to_string(),
        },
    ]
}

/// Print the banner (headless mode)
pub fn print_startup(config: &Config) {
    use colors::*;

    println!();
    println!("  {BOLD}{CYAN}chat-shell{RESET} {DIM}v{VERSION}{RESET}");
    println!();

    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("  {DIM}Config:{RESET} {GREEN}✓{RESET} {}", path.display());
        } else {
            println!("  {DIM}Config:{RESET} {DIM}(using defaults){RESET}");
        }
    }

    for item in startup_items(config) {
        let (icon, style) = if item.enabled {
            (format!("{GREEN}✓{RESET}"), "")
        } else {
            (format!("{DIM}○{RESET}"), DIM)
        };
        println!(
            "    {icon} {style}{:<10}{RESET} {DIM}{}{RESET}",
            item.name, item.detail
        );
    }
    println!();
}

/// Log the startup summary (terminal mode)
pub fn log_startup(config: &Config, state: &PersistedState) {
    tracing::info!("chat-shell v{}", VERSION);
    for item in startup_items(config) {
        let icon = if item.enabled { "✓" } else { "○" };
        tracing::info!("  {} {} - {}", icon, item.name, item.detail);
    }
    tracing::info!(
        "Loaded {} session(s), theme {}",
        state.sessions.len(),
        state.config.theme.as_str()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_item_reflects_config() {
        let mut config = Config::default();
        let items = startup_items(&config);
        let register = items.iter().find(|i| i.name == "register").unwrap();
        assert!(!register.enabled);
        assert_eq!(register.detail, "not configured");

        config.registration_url = Some("https://accounts.example.com".to_string());
        let items = startup_items(&config);
        let register = items.iter().find(|i| i.name == "register").unwrap();
        assert!(register.enabled);
    }
}
