// Resolved terminal palette
//
// The document decides light vs dark; the palette turns that into concrete
// ratatui colors. The background comes straight from the color hint the host
// would honour, so what the terminal paints always agrees with the hint.

use super::document::{ColorScheme, HostDocument};
use crate::model::ShellConfig;
use ratatui::style::Color;
use ratatui::widgets::BorderType;

#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub scheme: ColorScheme,
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub border: Color,
    pub border_focused: Color,
    pub selection: Color,
    pub user: Color,
    pub assistant: Color,
    pub error: Color,
    pub status_bar: Color,
    pub border_type: BorderType,
}

impl Palette {
    /// Build the palette for the document's effective scheme
    pub fn resolve(document: &HostDocument, config: &ShellConfig) -> Self {
        let scheme = document.effective_scheme();
        let mut palette = match scheme {
            ColorScheme::Dark => Self::dark(),
            ColorScheme::Light => Self::light(),
        };
        // Explicit themes write the computed color into both hints, so the
        // active hint matches the scheme; in auto mode it follows preference.
        if let Some(hint) = document.active_hint() {
            palette.background = parse_color(hint);
        }
        palette.border_type = if config.tight_border {
            BorderType::Plain
        } else {
            BorderType::Rounded
        };
        palette
    }

    fn dark() -> Self {
        Self {
            scheme: ColorScheme::Dark,
            background: parse_color("#151515"),
            foreground: parse_color("#e0e0e0"),
            muted: parse_color("#6c6c6c"),
            border: parse_color("#3a3a3a"),
            border_focused: parse_color("#d7875f"),
            selection: parse_color("#303030"),
            user: parse_color("#87afd7"),
            assistant: parse_color("#afd787"),
            error: parse_color("#ff5f5f"),
            status_bar: parse_color("#8a8a8a"),
            border_type: BorderType::Rounded,
        }
    }

    fn light() -> Self {
        Self {
            scheme: ColorScheme::Light,
            background: parse_color("#fafafa"),
            foreground: parse_color("#262626"),
            muted: parse_color("#8a8a8a"),
            border: parse_color("#d0d0d0"),
            border_focused: parse_color("#af5f00"),
            selection: parse_color("#e4e4e4"),
            user: parse_color("#005f87"),
            assistant: parse_color("#5f8700"),
            error: parse_color("#d70000"),
            status_bar: parse_color("#585858"),
            border_type: BorderType::Rounded,
        }
    }
}

/// Parse `#RRGGBB` into a ratatui color; anything else resets to the terminal default
pub fn parse_color(value: &str) -> Color {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Color::Reset;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
        _ => Color::Reset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Theme;
    use crate::theme::sync::apply;

    #[test]
    fn parses_hex_and_falls_back() {
        assert_eq!(parse_color("#151515"), Color::Rgb(0x15, 0x15, 0x15));
        assert_eq!(parse_color("fafafa"), Color::Rgb(0xfa, 0xfa, 0xfa));
        assert_eq!(parse_color("#fff"), Color::Reset);
        assert_eq!(parse_color("#zzzzzz"), Color::Reset);
    }

    #[test]
    fn explicit_light_overrides_dark_preference() {
        let mut doc = HostDocument::new(ColorScheme::Dark);
        apply(Theme::Light, &mut doc);
        let palette = Palette::resolve(&doc, &ShellConfig::default());
        assert_eq!(palette.scheme, ColorScheme::Light);
        assert_eq!(palette.background, Color::Rgb(0xfa, 0xfa, 0xfa));
    }

    #[test]
    fn auto_follows_preference() {
        let mut doc = HostDocument::new(ColorScheme::Light);
        apply(Theme::Auto, &mut doc);
        assert_eq!(
            Palette::resolve(&doc, &ShellConfig::default()).scheme,
            ColorScheme::Light
        );
        doc.set_preference(ColorScheme::Dark);
        let palette = Palette::resolve(&doc, &ShellConfig::default());
        assert_eq!(palette.scheme, ColorScheme::Dark);
        assert_eq!(palette.background, Color::Rgb(0x15, 0x15, 0x15));
    }

    #[test]
    fn tight_border_uses_plain_borders() {
        let doc = HostDocument::new(ColorScheme::Dark);
        let config = ShellConfig {
            tight_border: true,
            ..ShellConfig::default()
        };
        assert_eq!(Palette::resolve(&doc, &config).border_type, BorderType::Plain);
    }
}
