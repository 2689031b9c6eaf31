//! Host document model
//!
//! The shell's presentation state lives in a small document: a set of root
//! classes, two color-hint elements (one scoped to the dark color-scheme
//! media condition, one unscoped) and a stylesheet that computes
//! `--theme-color` from the root classes and the host preference.

use std::collections::{BTreeSet, HashMap};

/// Computed theme color under the dark scheme
pub const DARK_THEME_COLOR: &str = "#151515";

/// Computed theme color under the light scheme
pub const LIGHT_THEME_COLOR: &str = "#fafafa";

/// Custom property read by the synchronizer for explicit themes
pub const THEME_COLOR_PROPERTY: &str = "--theme-color";

/// Host color-scheme preference (the `prefers-color-scheme` media state)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    Light,
    #[default]
    Dark,
}

impl ColorScheme {
    /// Parse `light` / `dark` (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    /// Guess from the `COLORFGBG` convention ("fg;bg"); light backgrounds are 7 and 15
    pub fn from_colorfgbg(value: &str) -> Option<Self> {
        let bg = value.rsplit(';').next()?.trim().parse::<u8>().ok()?;
        Some(if bg == 7 || bg == 15 {
            Self::Light
        } else {
            Self::Dark
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// The two environment-facing color hint elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorHint {
    /// Hint scoped to the dark-preference media condition
    DarkMedia,
    /// Unscoped hint, effective when the dark condition does not match
    Default,
}

/// Operations the theme synchronizer needs from a host document
pub trait Document {
    fn add_root_class(&mut self, class: &str);

    fn remove_root_class(&mut self, class: &str);

    /// Computed value of a custom property, `None` when undefined
    fn computed_property(&self, name: &str) -> Option<String>;

    /// Hint element content, `None` when the element does not exist
    fn color_hint_mut(&mut self, hint: ColorHint) -> Option<&mut String>;
}

/// In-memory document backing the terminal host
#[derive(Debug, Clone)]
pub struct HostDocument {
    root_classes: BTreeSet<String>,
    hints: HashMap<ColorHint, String>,
    preference: ColorScheme,
}

impl HostDocument {
    /// Document with both hint elements present
    pub fn new(preference: ColorScheme) -> Self {
        let mut hints = HashMap::new();
        hints.insert(ColorHint::DarkMedia, DARK_THEME_COLOR.to_string());
        hints.insert(ColorHint::Default, LIGHT_THEME_COLOR.to_string());
        Self {
            root_classes: BTreeSet::new(),
            hints,
            preference,
        }
    }

    /// Degenerate document with no hint elements
    #[cfg(test)]
    pub fn without_hints(preference: ColorScheme) -> Self {
        Self {
            root_classes: BTreeSet::new(),
            hints: HashMap::new(),
            preference,
        }
    }

    pub fn has_root_class(&self, class: &str) -> bool {
        self.root_classes.contains(class)
    }

    pub fn root_classes(&self) -> impl Iterator<Item = &str> {
        self.root_classes.iter().map(String::as_str)
    }

    pub fn color_hint(&self, hint: ColorHint) -> Option<&str> {
        self.hints.get(&hint).map(String::as_str)
    }

    pub fn preference(&self) -> ColorScheme {
        self.preference
    }

    #[cfg(test)]
    pub fn set_preference(&mut self, preference: ColorScheme) {
        self.preference = preference;
    }

    /// Scheme in effect: an explicit root class wins over the preference
    pub fn effective_scheme(&self) -> ColorScheme {
        if self.has_root_class("dark") {
            ColorScheme::Dark
        } else if self.has_root_class("light") {
            ColorScheme::Light
        } else {
            self.preference
        }
    }

    /// Hint the host would honour right now (media condition evaluated)
    pub fn active_hint(&self) -> Option<&str> {
        match self.preference {
            ColorScheme::Dark => self.color_hint(ColorHint::DarkMedia),
            ColorScheme::Light => self.color_hint(ColorHint::Default),
        }
    }
}

impl Document for HostDocument {
    fn add_root_class(&mut self, class: &str) {
        self.root_classes.insert(class.to_string());
    }

    fn remove_root_class(&mut self, class: &str) {
        self.root_classes.remove(class);
    }

    fn computed_property(&self, name: &str) -> Option<String> {
        if name != THEME_COLOR_PROPERTY {
            return None;
        }
        let color = match self.effective_scheme() {
            ColorScheme::Dark => DARK_THEME_COLOR,
            ColorScheme::Light => LIGHT_THEME_COLOR,
        };
        Some(color.to_string())
    }

    fn color_hint_mut(&mut self, hint: ColorHint) -> Option<&mut String> {
        self.hints.get_mut(&hint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colorfgbg_heuristic() {
        assert_eq!(ColorScheme::from_colorfgbg("15;0"), Some(ColorScheme::Dark));
        assert_eq!(ColorScheme::from_colorfgbg("0;15"), Some(ColorScheme::Light));
        assert_eq!(ColorScheme::from_colorfgbg("0;default;7"), Some(ColorScheme::Light));
        assert_eq!(ColorScheme::from_colorfgbg("garbage"), None);
    }

    #[test]
    fn explicit_class_overrides_preference() {
        let mut doc = HostDocument::new(ColorScheme::Dark);
        assert_eq!(doc.effective_scheme(), ColorScheme::Dark);
        doc.add_root_class("light");
        assert_eq!(doc.effective_scheme(), ColorScheme::Light);
        assert_eq!(
            doc.computed_property(THEME_COLOR_PROPERTY).as_deref(),
            Some(LIGHT_THEME_COLOR)
        );
        assert_eq!(doc.computed_property("--unknown"), None);
    }
}
