//! CLI entry point for `popcheck`.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use popcheck::cancel::CancelFlag;
use popcheck::config::{self, Config};
use popcheck::listing::{export, import};
use popcheck::model::store::MessageStore;
use popcheck::pop3::{Credentials, FetchOutcome, Session, Transport};
use popcheck::tui::{self, app::ExitAction};

#[derive(Parser)]
#[command(
    name = "popcheck",
    version,
    about = "Check a POP3 mailbox and delete unwanted messages without downloading them"
)]
struct Cli {
    /// POP3 server host name
    #[arg(short = 's', long, value_name = "HOST")]
    server: Option<String>,

    /// POP3 server port [default: 110]
    #[arg(short = 'P', long)]
    port: Option<u16>,

    /// Mailbox user name
    #[arg(short = 'u', long)]
    user: Option<String>,

    /// Mailbox password (prompted for if omitted)
    #[arg(short = 'p', long, env = "POPCHECK_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Write the message listing to FILE instead of opening the review screen
    #[arg(short = 'o', long, value_name = "FILE", conflicts_with = "input")]
    output: Option<PathBuf>,

    /// Delete the messages listed in FILE instead of opening the review screen
    #[arg(short = 'i', long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Configuration file (default: ~/.config/popcheck/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// What to do once the headers are in.
enum Mode {
    Review,
    Export(PathBuf),
    Import(PathBuf),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = config::load_config(cli.config.as_deref());

    let mode = match (&cli.output, &cli.input) {
        (Some(path), _) => Mode::Export(path.clone()),
        (None, Some(path)) => Mode::Import(path.clone()),
        (None, None) => Mode::Review,
    };

    // Configure logging: log file, plus stderr unless the TUI owns the terminal
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config, !matches!(mode, Mode::Review));

    let host = cli
        .server
        .clone()
        .or_else(|| config.server.host.clone())
        .ok_or_else(|| anyhow::anyhow!("No POP server given (use -s HOST or set server.host)"))?;
    let user = cli
        .user
        .clone()
        .or_else(|| config.server.user.clone())
        .ok_or_else(|| anyhow::anyhow!("No user given (use -u USER or set server.user)"))?;
    let port = cli.port.unwrap_or(config.server.port);
    let password = match cli.password.clone() {
        Some(p) => p,
        None => rpassword::prompt_password("POP Password: ")?,
    };

    println!("Sending logon information");
    let mut session = Session::connect(
        &host,
        port,
        Credentials::new(user, password),
        config.performance.recv_buffer_size,
    )?;
    println!("Connected to POP Host");

    // From here on Ctrl+C winds down through QUIT instead of killing us.
    let cancel = CancelFlag::new();
    if let Err(e) = cancel.install_handler() {
        tracing::warn!(error = %e, "Could not install Ctrl+C handler");
    }

    let result = process_mailbox(&mut session, mode, &config, &cancel);

    session.quit();
    println!("Disconnected from POP Host");

    result
}

/// STAT, LIST, TOP for every message, then export / import / review.
fn process_mailbox<T: Transport>(
    session: &mut Session<T>,
    mode: Mode,
    config: &Config,
    cancel: &CancelFlag,
) -> anyhow::Result<()> {
    let count = session.stat()?;
    if count == 0 {
        eprintln!("No messages on POP Host");
        return Ok(());
    }
    tracing::info!(count, user = session.user(), "Mailbox opened");

    let mut store = MessageStore::new(count as usize)?;
    session.list_sizes(&mut store)?;
    tracing::info!(total_bytes = store.total_size(), "Message sizes listed");
    fetch_headers(session, &mut store, cancel);
    if cancel.is_cancelled() {
        println!("Interrupted, nothing deleted");
        return Ok(());
    }

    match mode {
        Mode::Export(path) => cmd_export(&store, &path),
        Mode::Import(path) => cmd_import(&store, session, &path, cancel),
        Mode::Review => cmd_review(&mut store, session, config, cancel),
    }
}

/// Fetch sender and subject for each message, with a progress bar.
///
/// A failed `TOP` or an interrupt stops retrieval; what was fetched so far
/// is kept.
fn fetch_headers<T: Transport>(
    session: &mut Session<T>,
    store: &mut MessageStore,
    cancel: &CancelFlag,
) {
    let total = store.len() as u64;
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("Getting data for message {pos} of {len} [{bar:40.cyan/blue}]")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    match session.fetch_all_headers(store, cancel, |number| pb.set_position(u64::from(number))) {
        FetchOutcome::Complete => pb.finish_and_clear(),
        FetchOutcome::Interrupted { .. } => pb.abandon(),
        FetchOutcome::Failed { error, .. } => {
            pb.abandon();
            eprintln!("{error}");
        }
    }
}

/// Write the listing file.
fn cmd_export(store: &MessageStore, path: &Path) -> anyhow::Result<()> {
    print!("Dumping data to file '{}'... ", path.display());
    std::io::stdout().flush()?;
    export::export_listing(store, path)?;
    println!("Done");
    Ok(())
}

/// Confirm, then delete the messages named in the listing file.
fn cmd_import<T: Transport>(
    store: &MessageStore,
    session: &mut Session<T>,
    path: &Path,
    cancel: &CancelFlag,
) -> anyhow::Result<()> {
    // Fail on a missing file before asking anything.
    std::fs::metadata(path).map_err(|e| popcheck::error::PopError::file(path, e))?;

    print!(
        "You're about to delete all messages specified in '{}', are you sure this is what you want? ",
        path.display()
    );
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    if cancel.is_cancelled() || !answer.trim_start().starts_with(['y', 'Y']) {
        println!("Bailing out!");
        return Ok(());
    }

    let report = import::import_file(path, store, session)?;
    for mismatch in &report.mismatched {
        println!("{mismatch}");
    }
    for (number, err) in &report.failed {
        eprintln!("Message {number}: {err}");
    }
    println!("Done! {} message(s) deleted", report.deleted.len());
    Ok(())
}

/// Interactive review screen.
fn cmd_review<T: Transport>(
    store: &mut MessageStore,
    session: &mut Session<T>,
    config: &Config,
    cancel: &CancelFlag,
) -> anyhow::Result<()> {
    let outcome = tui::run_review(store, session, &config.display.theme, cancel)?;
    match (outcome.action, outcome.commit) {
        (ExitAction::Save, Some(report)) => {
            for (number, err) in &report.failed {
                eprintln!("Message {number}: {err}");
            }
            println!("{} message(s) deleted", report.deleted.len());
        }
        (ExitAction::Interrupted, _) => println!("Interrupted, nothing deleted"),
        _ => println!("Nothing deleted"),
    }
    Ok(())
}

/// Set up tracing with file output and, for non-interactive runs, stderr.
fn setup_logging(level: &str, config: &Config, to_stderr: bool) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = to_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .without_time()
    });

    // Try to set up file logging
    let log_path = config::log_file_path(config);
    let log_dir = config::cache_dir(config);
    let file_layer = if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_name = log_path.file_name().unwrap_or("popcheck.log".as_ref());
        let file_appender = tracing_appender::rolling::never(&log_dir, file_name);
        Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_appender),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
}
