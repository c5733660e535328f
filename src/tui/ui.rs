//! Main render function that dispatches to widgets.

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

use super::app::App;
use super::theme::Theme;
use super::widgets;

/// Render the entire TUI frame.
pub fn render(frame: &mut Frame, app: &App) {
    let theme = Theme::from_name(&app.theme);

    // Vertical layout: message rows (flex) + status line (1)
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(frame.area());

    widgets::message_list::render(frame, app, &theme, vertical[0]);
    widgets::status_bar::render(frame, app, &theme, vertical[1]);
}
