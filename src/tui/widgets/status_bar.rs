//! Bottom status line: key usage on the left, mailbox totals on the right.

use humansize::{format_size, BINARY};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::app::App;
use crate::tui::theme::Theme;

/// Key hints, in the order they are shown.
const HINTS: [(&str, &str); 3] = [
    ("Q", "Quit without saving"),
    ("S", "Quit and save"),
    ("D", "Mark for delete"),
];

/// Render the status line.
pub fn render(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let summary = summary_text(app);
    let summary_width = summary.chars().count() as u16;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(summary_width)])
        .split(area);

    let mut spans = vec![Span::styled(" USAGE:", theme.status_bar)];
    for (key, desc) in HINTS {
        spans.push(Span::styled(format!(" {key}"), theme.status_key));
        spans.push(Span::styled(format!(" - {desc} "), theme.status_bar));
    }
    let hints = Paragraph::new(Line::from(spans)).style(theme.status_bar);
    frame.render_widget(hints, chunks[0]);

    let totals = Paragraph::new(Line::from(Span::styled(summary, theme.status_bar)))
        .alignment(Alignment::Right)
        .style(theme.status_bar);
    frame.render_widget(totals, chunks[1]);
}

/// `2 marked (1.5 KiB) | 3/40 ` style summary.
fn summary_text(app: &App) -> String {
    let marked = app.store.marked_count();
    let position = format!("{}/{}", (app.viewport.index() + 1).min(app.count()), app.count());
    if marked == 0 {
        format!("{position} ")
    } else {
        format!(
            "{marked} marked ({}) | {position} ",
            format_size(app.store.marked_size(), BINARY)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::store::MessageStore;

    #[test]
    fn test_summary_counts_marked() {
        let mut store = MessageStore::new(4).unwrap();
        store.get_mut(2).unwrap().size = 2048;
        store.toggle(2);
        let app = App::new(&mut store, 10, "dark");
        assert_eq!(summary_text(&app), "1 marked (2 KiB) | 1/4 ");
    }

    #[test]
    fn test_summary_without_marks() {
        let mut store = MessageStore::new(4).unwrap();
        let app = App::new(&mut store, 10, "dark");
        assert_eq!(summary_text(&app), "1/4 ");
    }
}
