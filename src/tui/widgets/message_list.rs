//! Message list widget: one row per visible message.

use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::model::message::Message;
use crate::tui::app::App;
use crate::tui::theme::Theme;

/// Columns taken by everything except sender and subject:
/// `nnn: D ` + two gaps + `   ssssss`.
const FIXED_COLUMNS: usize = 18;

/// Width of the sender and subject columns for a terminal `width` wide.
pub fn text_column_width(width: usize) -> usize {
    width.saturating_sub(FIXED_COLUMNS) / 2
}

/// Render the rows between `window_start` and the bottom of `area`.
pub fn render(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let width = area.width as usize;
    let col = text_column_width(width);
    let start = app.viewport.window_start;
    let end = (start + area.height as usize).min(app.count());
    let selected = app.viewport.index();

    let lines: Vec<Line> = (start..end)
        .filter_map(|idx| app.store.at(idx).map(|msg| (idx, msg)))
        .map(|(idx, msg)| {
            let style = if idx == selected {
                theme.list_selected
            } else if msg.marked_for_deletion {
                theme.list_marked
            } else {
                theme.list_normal
            };
            Line::styled(pad_to(&format_row(msg, col), width), style)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).style(theme.list_normal), area);
}

/// `  1: D sender...  subject...   123456`
pub fn format_row(msg: &Message, col: usize) -> String {
    format!(
        "{:>3}: {} {}  {}   {:>6}",
        msg.number,
        msg.deletion_flag(),
        pad_to(msg.sender(), col),
        pad_to(msg.subject(), col),
        msg.size
    )
}

/// Truncate or space-pad `s` to exactly `width` display columns.
fn pad_to(s: &str, width: usize) -> String {
    let mut out = String::with_capacity(width);
    let mut used = 0;
    for ch in s.chars() {
        // Control characters would garble the row.
        let ch = if ch.is_control() { ' ' } else { ch };
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    let pad = width.saturating_sub(UnicodeWidthStr::width(out.as_str()));
    out.extend(std::iter::repeat(' ').take(pad));
    out
}
