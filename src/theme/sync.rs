//! Theme synchronizer
//!
//! Projects `ShellConfig::theme` onto the host document whenever it changes.

use super::document::{
    ColorHint, Document, DARK_THEME_COLOR, LIGHT_THEME_COLOR, THEME_COLOR_PROPERTY,
};
use crate::model::Theme;

/// Classes this synchronizer owns on the document root
const THEME_CLASSES: [&str; 2] = ["light", "dark"];

#[derive(Debug, Default)]
pub struct ThemeSynchronizer {
    applied: Option<Theme>,
}

impl ThemeSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn applied(&self) -> Option<Theme> {
        self.applied
    }

    /// Apply `theme` if it differs from what was last applied
    ///
    /// Returns whether the document was touched.
    pub fn sync(&mut self, theme: Theme, document: &mut dyn Document) -> bool {
        if self.applied == Some(theme) {
            return false;
        }
        apply(theme, document);
        self.applied = Some(theme);
        true
    }
}

/// Set root classes and color hints for `theme`
///
/// Missing hint elements are skipped silently; hints are an enhancement.
pub fn apply(theme: Theme, document: &mut dyn Document) {
    for class in THEME_CLASSES {
        document.remove_root_class(class);
    }
    if let Some(class) = theme.root_class() {
        document.add_root_class(class);
    }

    match theme {
        Theme::Auto => {
            // Media-scoped pair: the host picks whichever condition matches
            set_hint(document, ColorHint::DarkMedia, DARK_THEME_COLOR);
            set_hint(document, ColorHint::Default, LIGHT_THEME_COLOR);
        }
        Theme::Light | Theme::Dark => {
            let Some(color) = document.computed_property(THEME_COLOR_PROPERTY) else {
                return;
            };
            let color = color.trim().to_string();
            set_hint(document, ColorHint::DarkMedia, &color);
            set_hint(document, ColorHint::Default, &color);
        }
    }
    tracing::debug!("Applied theme {}", theme.as_str());
}

fn set_hint(document: &mut dyn Document, hint: ColorHint, content: &str) {
    if let Some(element) = document.color_hint_mut(hint) {
        element.clear();
        element.push_str(content);
    }
}
