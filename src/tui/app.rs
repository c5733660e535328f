//! Review screen state: viewport arithmetic, deletion marks and commit.

use tracing::{info, warn};

use crate::cancel::CancelFlag;
use crate::model::store::MessageStore;
use crate::pop3::session::Session;
use crate::pop3::transport::Transport;

/// How the review loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitAction {
    /// Delete the marked messages, then quit.
    Save,
    /// Quit without deleting anything.
    Discard,
    /// Interrupted (Ctrl+C or SIGINT): same teardown as `Discard`.
    Interrupted,
}

/// Window over the message list.
///
/// `cursor_row` may briefly fall outside the visible rows after a
/// navigation step; [`Viewport::clamp`] scrolls the window to bring it back
/// and must run before every render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Index of the first visible message.
    pub window_start: usize,
    /// Row of the cursor within the window.
    pub cursor_row: isize,
    /// Number of message rows on screen (terminal height minus status line).
    pub rows: usize,
}

impl Viewport {
    pub fn new(rows: usize) -> Self {
        Self {
            window_start: 0,
            cursor_row: 0,
            rows: rows.max(1),
        }
    }

    /// Update the number of visible rows (after a terminal resize).
    pub fn set_rows(&mut self, rows: usize) {
        self.rows = rows.max(1);
    }

    /// Distance moved by page up/down: one screen minus one line of overlap.
    pub fn page(&self) -> isize {
        (self.rows as isize - 1).max(1)
    }

    /// Move the cursor by `delta` rows. Call [`clamp`](Self::clamp) afterwards.
    pub fn move_by(&mut self, delta: isize) {
        self.cursor_row = self.cursor_row.saturating_add(delta);
    }

    /// Bring the cursor back into the window and the window into the list.
    pub fn clamp(&mut self, count: usize) {
        if count == 0 {
            self.window_start = 0;
            self.cursor_row = 0;
            return;
        }
        let rows = self.rows as isize;

        while self.cursor_row >= rows {
            if self.window_start + self.rows < count {
                self.window_start += 1;
            }
            self.cursor_row -= 1;
        }
        while self.cursor_row < 0 {
            if self.window_start > 0 {
                self.window_start -= 1;
            }
            self.cursor_row += 1;
        }

        // A taller terminal can leave blank rows under the last message.
        let max_start = count.saturating_sub(self.rows);
        if self.window_start > max_start {
            self.cursor_row += (self.window_start - max_start) as isize;
            self.window_start = max_start;
        }

        let last_row = (count - 1 - self.window_start) as isize;
        if self.cursor_row > last_row {
            self.cursor_row = last_row;
        }
    }

    /// Position of the selected message. Only meaningful after `clamp`.
    pub fn index(&self) -> usize {
        self.window_start + self.cursor_row.max(0) as usize
    }

    pub fn home(&mut self) {
        self.window_start = 0;
        self.cursor_row = 0;
    }

    pub fn end(&mut self, count: usize) {
        self.window_start = count.saturating_sub(self.rows);
        self.cursor_row = count.saturating_sub(1 + self.window_start) as isize;
    }
}

/// Complete review screen state.
pub struct App<'a> {
    /// The mailbox being reviewed.
    pub store: &'a mut MessageStore,
    /// Scroll state.
    pub viewport: Viewport,
    /// Color theme name from the config.
    pub theme: String,
    /// Set once the operator chose how to leave.
    pub exit: Option<ExitAction>,
    /// Raised by the interrupt handler or the Ctrl+C key.
    pub cancel: CancelFlag,
}

impl<'a> App<'a> {
    pub fn new(store: &'a mut MessageStore, rows: usize, theme: impl Into<String>) -> Self {
        Self {
            store,
            viewport: Viewport::new(rows),
            theme: theme.into(),
            exit: None,
            cancel: CancelFlag::new(),
        }
    }

    /// Share `cancel` with the rest of the process.
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Number of messages.
    pub fn count(&self) -> usize {
        self.store.len()
    }

    /// Scroll/clamp state for the current terminal height.
    pub fn prepare_render(&mut self, rows: usize) {
        self.viewport.set_rows(rows);
        self.viewport.clamp(self.count());
    }

    pub fn move_down(&mut self) {
        self.viewport.move_by(1);
        self.viewport.clamp(self.count());
    }

    pub fn move_up(&mut self) {
        self.viewport.move_by(-1);
        self.viewport.clamp(self.count());
    }

    pub fn page_down(&mut self) {
        self.viewport.move_by(self.viewport.page());
        self.viewport.clamp(self.count());
    }

    pub fn page_up(&mut self) {
        self.viewport.move_by(-self.viewport.page());
        self.viewport.clamp(self.count());
    }

    pub fn go_first(&mut self) {
        self.viewport.home();
    }

    pub fn go_last(&mut self) {
        let count = self.count();
        self.viewport.end(count);
    }

    /// Flip the deletion mark on the current message and step down, so a
    /// run of messages can be marked by holding the key.
    pub fn toggle_current(&mut self) {
        if let Some(msg) = self.store.at_mut(self.viewport.index()) {
            msg.marked_for_deletion = !msg.marked_for_deletion;
        }
        self.move_down();
    }

    /// Leave the review loop with `action`.
    pub fn request_exit(&mut self, action: ExitAction) {
        self.exit = Some(action);
    }

    /// Turn a raised cancel flag into an exit. An explicit choice made
    /// earlier wins.
    pub fn observe_cancel(&mut self) {
        if self.exit.is_none() && self.cancel.is_cancelled() {
            self.exit = Some(ExitAction::Interrupted);
        }
    }

    pub fn should_quit(&self) -> bool {
        self.exit.is_some()
    }
}

/// Result of committing deletions.
#[derive(Debug, Default)]
pub struct CommitReport {
    /// Messages the server accepted `DELE` for.
    pub deleted: Vec<u32>,
    /// Messages whose `DELE` was rejected, with the error text.
    pub failed: Vec<(u32, String)>,
}

/// Send `DELE` for every marked message, lowest number first.
///
/// A rejected deletion is recorded and the remaining ones are still sent.
pub fn commit<T: Transport>(store: &MessageStore, session: &mut Session<T>) -> CommitReport {
    let mut report = CommitReport::default();
    for number in store.marked_numbers() {
        match session.delete(number) {
            Ok(()) => report.deleted.push(number),
            Err(e) => {
                warn!(number, error = %e, "DELE rejected");
                report.failed.push((number, e.to_string()));
            }
        }
    }
    info!(
        deleted = report.deleted.len(),
        failed = report.failed.len(),
        "Deletions committed"
    );
    report
}
