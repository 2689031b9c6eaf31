// Theme system for the terminal host
//
// - document: the host document (root classes, color hints, computed style)
// - sync: projects the configured theme onto the document
// - palette: resolves ratatui colors from the document

mod document;
mod palette;
mod sync;

pub use document::{ColorScheme, HostDocument};
pub use palette::Palette;
pub use sync::ThemeSynchronizer;

/// Environment variable overriding the detected color-scheme preference
pub const COLOR_SCHEME_ENV: &str = "CHAT_SHELL_COLOR_SCHEME";

/// Detect the host color-scheme preference
///
/// Order: configured override, `CHAT_SHELL_COLOR_SCHEME`, `COLORFGBG`, dark.
pub fn detect_color_scheme(configured: Option<&str>) -> ColorScheme {
    configured
        .and_then(ColorScheme::parse)
        .or_else(|| {
            std::env::var(COLOR_SCHEME_ENV)
                .ok()
                .and_then(|v| ColorScheme::parse(&v))
        })
        .or_else(|| {
            std::env::var("COLORFGBG")
                .ok()
                .and_then(|v| ColorScheme::from_colorfgbg(&v))
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_preference_wins() {
        assert_eq!(detect_color_scheme(Some("light")), ColorScheme::Light);
        assert_eq!(detect_color_scheme(Some("DARK")), ColorScheme::Dark);
    }
}
