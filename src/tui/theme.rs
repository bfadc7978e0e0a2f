//! TUI theme definitions.

use ratatui::style::{Color, Modifier, Style};

/// Theme configuration for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,

    // Base colors
    pub background: Color,
    pub foreground: Color,
    pub dim: Color,
    pub accent: Color,
    pub error: Color,
    pub warning: Color,
    pub success: Color,
    pub input_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),

            background: Color::Rgb(30, 30, 30),
            foreground: Color::Rgb(220, 220, 220),
            dim: Color::Rgb(128, 128, 128),
            accent: Color::Rgb(138, 180, 248),
            error: Color::Rgb(244, 135, 135),
            warning: Color::Rgb(255, 200, 100),
            success: Color::Rgb(144, 238, 144),
            input_bg: Color::Rgb(50, 50, 65),
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            name: "light".to_string(),

            background: Color::Rgb(250, 250, 250),
            foreground: Color::Rgb(40, 40, 40),
            dim: Color::Rgb(140, 140, 140),
            accent: Color::Rgb(0, 100, 200),
            error: Color::Rgb(200, 50, 50),
            warning: Color::Rgb(200, 150, 0),
            success: Color::Rgb(50, 150, 50),
            input_bg: Color::Rgb(230, 235, 245),
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Get style for text
    pub fn text(&self) -> Style {
        Style::default().fg(self.foreground)
    }

    /// Get style for dimmed text
    pub fn text_dim(&self) -> Style {
        Style::default().fg(self.dim)
    }

    /// Get style for accent text
    pub fn text_accent(&self) -> Style {
        Style::default().fg(self.accent)
    }

    /// Border style; accented when focused
    pub fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.accent)
        } else {
            Style::default().fg(self.dim)
        }
    }

    /// Highlighted row in a table or list
    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.background)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }
}
