//! Persisted appearance/layout configuration
//!
//! `ShellConfig` is the user-adjustable part of the persisted state blob.
//! Every path that writes `sidebar_width` goes through [`clamp_sidebar_width`].

use serde::{Deserialize, Serialize};

/// Narrowest legal sidebar width
pub const MIN_SIDEBAR_WIDTH: f64 = 220.0;

/// Widest legal sidebar width
pub const MAX_SIDEBAR_WIDTH: f64 = 500.0;

/// Width used for fresh configs and for non-finite input
pub const DEFAULT_SIDEBAR_WIDTH: f64 = 300.0;

/// Clamp a candidate sidebar width into `[MIN_SIDEBAR_WIDTH, MAX_SIDEBAR_WIDTH]`.
///
/// NaN and infinities come from arithmetic on untrusted pointer input and
/// collapse to the default rather than to a bound.
pub fn clamp_sidebar_width(width: f64) -> f64 {
    if !width.is_finite() {
        return DEFAULT_SIDEBAR_WIDTH;
    }
    width.clamp(MIN_SIDEBAR_WIDTH, MAX_SIDEBAR_WIDTH)
}

/// Color theme selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    /// Follow the host color-scheme preference
    #[default]
    Auto,
}

impl Theme {
    /// Cycle auto → light → dark → auto (settings panel order)
    pub fn next(self) -> Self {
        match self {
            Theme::Auto => Theme::Light,
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Auto,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Auto => "auto",
        }
    }

    /// Root class applied to the host document, `None` for auto
    pub fn root_class(&self) -> Option<&'static str> {
        match self {
            Theme::Light => Some("light"),
            Theme::Dark => Some("dark"),
            Theme::Auto => None,
        }
    }
}

/// Key binding that submits the composed message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubmitKey {
    Enter,
    #[default]
    CtrlEnter,
    ShiftEnter,
    AltEnter,
}

impl SubmitKey {
    pub fn next(self) -> Self {
        match self {
            SubmitKey::Enter => SubmitKey::CtrlEnter,
            SubmitKey::CtrlEnter => SubmitKey::ShiftEnter,
            SubmitKey::ShiftEnter => SubmitKey::AltEnter,
            SubmitKey::AltEnter => SubmitKey::Enter,
        }
    }

    /// Human-readable label for the settings panel and composer hint
    pub fn label(&self) -> &'static str {
        match self {
            SubmitKey::Enter => "Enter",
            SubmitKey::CtrlEnter => "Ctrl + Enter",
            SubmitKey::ShiftEnter => "Shift + Enter",
            SubmitKey::AltEnter => "Alt + Enter",
        }
    }
}

/// User-adjustable appearance and layout configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShellConfig {
    pub theme: Theme,

    /// Drop the outer chrome margin (ignored on mobile-width viewports)
    pub tight_border: bool,

    pub sidebar_width: f64,

    pub submit_key: SubmitKey,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            theme: Theme::Auto,
            tight_border: false,
            sidebar_width: DEFAULT_SIDEBAR_WIDTH,
            submit_key: SubmitKey::CtrlEnter,
        }
    }
}

impl ShellConfig {
    /// Re-establish field invariants; returns the validated config
    pub fn validated(mut self) -> Self {
        self.sidebar_width = clamp_sidebar_width(self.sidebar_width);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_keeps_in_range_values() {
        assert_eq!(clamp_sidebar_width(220.0), 220.0);
        assert_eq!(clamp_sidebar_width(333.5), 333.5);
        assert_eq!(clamp_sidebar_width(500.0), 500.0);
    }

    #[test]
    fn clamp_bounds_out_of_range_values() {
        assert_eq!(clamp_sidebar_width(-40.0), MIN_SIDEBAR_WIDTH);
        assert_eq!(clamp_sidebar_width(219.9), MIN_SIDEBAR_WIDTH);
        assert_eq!(clamp_sidebar_width(700.0), MAX_SIDEBAR_WIDTH);
        assert_eq!(clamp_sidebar_width(f64::MAX), MAX_SIDEBAR_WIDTH);
    }

    #[test]
    fn clamp_non_finite_falls_back_to_default() {
        assert_eq!(clamp_sidebar_width(f64::NAN), DEFAULT_SIDEBAR_WIDTH);
        assert_eq!(clamp_sidebar_width(f64::INFINITY), DEFAULT_SIDEBAR_WIDTH);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: ShellConfig = serde_json::from_str(r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.sidebar_width, DEFAULT_SIDEBAR_WIDTH);
        assert_eq!(config.submit_key, SubmitKey::CtrlEnter);
    }

    #[test]
    fn validated_clamps_width() {
        let config = ShellConfig {
            sidebar_width: 900.0,
            ..ShellConfig::default()
        }
        .validated();
        assert_eq!(config.sidebar_width, MAX_SIDEBAR_WIDTH);
    }

    #[test]
    fn theme_cycle_visits_every_mode() {
        assert_eq!(Theme::Auto.next(), Theme::Light);
        assert_eq!(Theme::Light.next(), Theme::Dark);
        assert_eq!(Theme::Dark.next(), Theme::Auto);
        assert_eq!(Theme::Auto.root_class(), None);
        assert_eq!(Theme::Dark.root_class(), Some("dark"));
    }
}
