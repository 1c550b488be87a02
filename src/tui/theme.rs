//! Theme colors for the terminal map viewer.
//!
//! The map background is always black so that translucent risk colors can be
//! blended against a known base.

use ratatui::style::Color;

use crate::models::RgbColor;

/// Base color translucent primitives are blended over.
pub const MAP_BACKGROUND: RgbColor = RgbColor::new(0, 0, 0);

/// Semantic color theme for the TUI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Primary color for borders and titles
    pub primary: Color,
    /// Accent color for the selected panel row
    pub accent: Color,
    /// Warning color for exceeding points
    pub warning: Color,
    /// Primary text content color
    pub text: Color,
    /// Muted text for help and hidden layers
    pub text_muted: Color,
    /// Selection background
    pub highlight_bg: Color,
    /// Map background
    pub background: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark theme.
    #[must_use]
    pub const fn dark() -> Self {
        Self {
            primary: Color::Cyan,
            accent: Color::Yellow,
            warning: Color::Red,
            text: Color::White,
            text_muted: Color::DarkGray,
            highlight_bg: Color::Rgb(40, 44, 52),
            background: MAP_BACKGROUND.to_ratatui_color(),
        }
    }
}
