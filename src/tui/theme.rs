//! Color theme definitions for the TUI.

use ratatui::style::{Color, Modifier, Style};

/// A complete color theme for the review screen.
pub struct Theme {
    pub status_bar: Style,
    pub status_key: Style,
    pub list_normal: Style,
    pub list_marked: Style,
    pub list_selected: Style,
}

impl Theme {
    /// Dark theme (default).
    pub fn dark() -> Self {
        Self {
            status_bar: Style::default()
                .fg(Color::Rgb(150, 150, 170))
                .bg(Color::Rgb(30, 30, 46)),
            status_key: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            list_normal: Style::default().fg(Color::Rgb(200, 200, 220)),
            list_marked: Style::default().fg(Color::Rgb(255, 120, 120)),
            list_selected: Style::default().add_modifier(Modifier::REVERSED),
        }
    }

    /// Light theme for bright terminal backgrounds.
    pub fn light() -> Self {
        Self {
            status_bar: Style::default()
                .fg(Color::Rgb(60, 60, 80))
                .bg(Color::Rgb(220, 220, 230)),
            status_key: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            list_normal: Style::default().fg(Color::Black),
            list_marked: Style::default().fg(Color::Red),
            list_selected: Style::default().add_modifier(Modifier::REVERSED),
        }
    }

    /// Pick a theme by its config name; unknown names get the dark theme.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }
}
