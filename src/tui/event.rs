//! Keyboard handling for the review screen.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::app::{App, ExitAction};

/// Process a key event and update the application state.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    // Raw mode turns Ctrl+C into a key press instead of SIGINT.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.cancel.cancel();
        return;
    }

    match key.code {
        // ── Navigation ───────────────────────────────────────
        KeyCode::Down | KeyCode::Char('n') | KeyCode::Char('j') => app.move_down(),
        KeyCode::Up | KeyCode::Char('p') | KeyCode::Char('k') => app.move_up(),
        KeyCode::PageDown | KeyCode::Char(' ') => app.page_down(),
        KeyCode::PageUp | KeyCode::Char('-') => app.page_up(),
        KeyCode::Home | KeyCode::Char('g') => app.go_first(),
        KeyCode::End | KeyCode::Char('G') => app.go_last(),

        // ── Actions ──────────────────────────────────────────
        KeyCode::Char('d') | KeyCode::Char('D') => app.toggle_current(),
        KeyCode::Char('s') | KeyCode::Char('S') => app.request_exit(ExitAction::Save),
        KeyCode::Char('q') | KeyCode::Char('Q') => app.request_exit(ExitAction::Discard),
        _ => {}
    }
}
