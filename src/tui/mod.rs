//! Terminal UI: review screen entry point and event loop.

pub mod app;
pub mod event;
pub mod theme;
pub mod ui;
pub mod widgets;

use std::io;
use std::time::Duration;

use crossterm::event::{poll as ct_poll, read as ct_read, Event};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

use self::app::{App, CommitReport, ExitAction};
use crate::cancel::CancelFlag;
use crate::model::store::MessageStore;
use crate::pop3::session::Session;
use crate::pop3::transport::Transport;

/// What happened on the review screen.
#[derive(Debug)]
pub struct ReviewOutcome {
    /// How the operator left.
    pub action: ExitAction,
    /// Deletion results when the operator chose to save.
    pub commit: Option<CommitReport>,
}

/// Run the review screen over `store`. Blocks until the operator leaves
/// or `cancel` is raised.
///
/// The terminal is restored before any deletion is sent, so per-message
/// failures can be reported on a normal screen.
pub fn run_review<T: Transport>(
    store: &mut MessageStore,
    session: &mut Session<T>,
    theme: &str,
    cancel: &CancelFlag,
) -> anyhow::Result<ReviewOutcome> {
    // Setup terminal (alternate screen)
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store, 1, theme).with_cancel(cancel.clone());

    // Run the event loop
    let result = run_event_loop(&mut terminal, &mut app);

    // Restore terminal (always, even on error)
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    let action = result?;
    info!(?action, "Review finished");

    let commit = match action {
        ExitAction::Save => Some(app::commit(store, session)),
        ExitAction::Discard | ExitAction::Interrupted => None,
    };
    Ok(ReviewOutcome { action, commit })
}

/// Main event loop: clamp → render → wait for input → handle → repeat.
///
/// Input is polled with a short tick so an interrupt raised outside the
/// loop is noticed without waiting for a key.
fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> anyhow::Result<ExitAction> {
    let tick_rate = Duration::from_millis(250);

    loop {
        let size = terminal.size()?;
        app.prepare_render(size.height.saturating_sub(1) as usize);

        terminal.draw(|frame| {
            ui::render(frame, app);
        })?;

        if ct_poll(tick_rate)? {
            if let Event::Key(key) = ct_read()? {
                event::handle_key_event(app, key);
            }
        }

        app.observe_cancel();
        if let Some(action) = app.exit {
            return Ok(action);
        }
    }
}
