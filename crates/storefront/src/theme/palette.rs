//! Color palettes for the light and dark themes.

use serde::Serialize;

/// Named colors used by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub primary_color: &'static str,
    pub bg_screen: &'static str,
    pub bg_container: &'static str,
    pub bg_light: &'static str,
    pub text_color: &'static str,
    pub border_color: &'static str,
    pub gray_text: &'static str,
    pub red: &'static str,
}

/// Palette for the light theme.
pub const LIGHT: Palette = Palette {
    primary_color: "#6058f0",
    bg_screen: "#f8f8f8",
    bg_container: "#fff",
    bg_light: "#f2f2f2",
    text_color: "#333",
    border_color: "#BDBDBD",
    gray_text: "#777",
    red: "#EB5757",
};

/// Palette for the dark theme. Accent colors match the light theme.
pub const DARK: Palette = Palette {
    bg_screen: "#232321",
    bg_container: "#31312F",
    bg_light: "#3f3f3f",
    text_color: "#eee",
    ..LIGHT
};
