//! POP3 session engine.
//!
//! Every command is sent as `VERB[ ARG]\r\n` and answered by one reply.
//! `STAT`, `USER`, `PASS`, `DELE` and `QUIT` get a single line; `LIST` and
//! `TOP` get a multi-line body ending in a dot line. The status line is
//! read in full, however many receives that takes, before it is
//! classified; a status line starting with `-ERR` fails the command.

use std::fmt;
use std::io::{BufReader, Seek, SeekFrom, Write};

use tracing::{debug, info, warn};

use super::headers::HeaderExtractor;
use super::response::{self, Status, TerminatorScanner};
use super::transport::{TcpTransport, Transport};
use crate::cancel::CancelFlag;
use crate::error::{PopError, Result};
use crate::model::message::{HeaderFields, RawHeaderFields};
use crate::model::store::MessageStore;

/// Default size of one socket read.
pub const DEFAULT_RECV_BUFFER: usize = 8 * 1024;

/// Mailbox login.
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// How a header sweep over the whole mailbox ended.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Every message was fetched.
    Complete,
    /// The cancel flag was raised; `next` was not requested.
    Interrupted { next: u32 },
    /// `TOP` for `number` failed; later messages were not requested.
    Failed { number: u32, error: PopError },
}

/// A logged-in POP3 session.
///
/// Dropping the session sends a best-effort `QUIT` and closes the
/// transport if [`Session::quit`] was not called already.
pub struct Session<T: Transport> {
    transport: T,
    credentials: Credentials,
    extractor: HeaderExtractor,
    buf: Vec<u8>,
    open: bool,
}

impl Session<TcpTransport> {
    /// Connect to `host:port`, read the greeting and log in.
    pub fn connect(
        host: &str,
        port: u16,
        credentials: Credentials,
        recv_buffer_size: usize,
    ) -> Result<Self> {
        let transport = TcpTransport::connect(host, port)?;
        info!(peer = %transport.peer(), "Connected to POP host");
        Self::open(transport, credentials, recv_buffer_size)
    }
}

impl<T: Transport> Session<T> {
    /// Drain the server greeting and authenticate with `USER`/`PASS`.
    ///
    /// On failure the connection is shut down (best effort) before the
    /// error is returned.
    pub fn open(transport: T, credentials: Credentials, recv_buffer_size: usize) -> Result<Self> {
        let mut session = Self {
            transport,
            credentials,
            extractor: HeaderExtractor::new(),
            buf: vec![0u8; recv_buffer_size.max(16)],
            open: true,
        };
        session.login()?;
        Ok(session)
    }

    fn login(&mut self) -> Result<()> {
        self.drain_greeting()?;
        let user = self.credentials.user.clone();
        self.simple_command("USER", Some(&user))?;
        let password = self.credentials.password.clone();
        self.simple_command("PASS", Some(&password))?;
        info!(user = %self.credentials.user, "Logged in");
        Ok(())
    }

    /// The user this session is logged in as.
    pub fn user(&self) -> &str {
        &self.credentials.user
    }

    /// Whether `QUIT` has not been sent yet.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Access the transport (mostly for tests).
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `STAT`: number of messages in the mailbox.
    pub fn stat(&mut self) -> Result<u32> {
        let n = self.command("STAT", None)?;
        response::parse_stat(&self.buf[..n]).ok_or_else(|| PopError::protocol("STAT", &self.buf[..n]))
    }

    /// `LIST`: fill in the size of every message in `store`.
    ///
    /// The reply is spooled to a temporary file until its terminator
    /// arrives, then parsed line by line.
    pub fn list_sizes(&mut self, store: &mut MessageStore) -> Result<()> {
        let mut n = self.command("LIST", None)?;
        let mut spool = tempfile::tempfile()?;
        let mut scanner = TerminatorScanner::new();
        let mut spooled = 0usize;
        loop {
            spool.write_all(&self.buf[..n])?;
            spooled += n;
            if scanner.feed(&self.buf[..n]) {
                break;
            }
            n = self.transport.receive(&mut self.buf)?;
            if n == 0 {
                warn!("Connection closed before end of LIST reply");
                break;
            }
        }
        debug!(bytes = spooled, "LIST reply spooled");

        spool.seek(SeekFrom::Start(0))?;
        let filled = response::parse_list_body(BufReader::new(spool), store)?;
        if filled < store.len() {
            warn!(filled, expected = store.len(), "LIST returned fewer sizes than STAT");
        }
        Ok(())
    }

    /// `TOP <n> 0`: fetch the header block of message `number` and pull
    /// out its sender and subject.
    pub fn fetch_top(&mut self, number: u32) -> Result<HeaderFields> {
        let arg = number.to_string();
        let mut n = self.command("TOP", Some(&format!("{arg} 0")))?;
        let mut raw = RawHeaderFields::default();
        let mut scanner = TerminatorScanner::new();
        let mut reset = true;
        loop {
            self.extractor.scan(&self.buf[..n], reset, &mut raw);
            reset = false;
            if scanner.feed(&self.buf[..n]) {
                break;
            }
            n = self.transport.receive(&mut self.buf)?;
            if n == 0 {
                warn!(number, "Connection closed before end of TOP reply");
                break;
            }
        }
        let fields = raw.decode();
        debug!(
            number,
            complete = self.extractor.is_complete(),
            sender = %fields.sender,
            subject = %fields.subject,
            "Headers extracted"
        );
        Ok(fields)
    }

    /// Fetch sender and subject for every message in `store`, in order.
    ///
    /// `progress` is called with each message number just before its `TOP`
    /// is sent. The sweep stops at the first failing `TOP`, or before the
    /// next one once `cancel` is raised; headers fetched so far are kept.
    pub fn fetch_all_headers<F: FnMut(u32)>(
        &mut self,
        store: &mut MessageStore,
        cancel: &CancelFlag,
        mut progress: F,
    ) -> FetchOutcome {
        let numbers: Vec<u32> = store.iter().map(|m| m.number).collect();
        for number in numbers {
            if cancel.is_cancelled() {
                info!(number, "Header retrieval interrupted");
                return FetchOutcome::Interrupted { next: number };
            }
            progress(number);
            match self.fetch_top(number) {
                Ok(fields) => {
                    if let Some(msg) = store.get_mut(number) {
                        msg.headers = fields;
                    }
                }
                Err(error) => {
                    warn!(number, error = %error, "Header retrieval stopped");
                    return FetchOutcome::Failed { number, error };
                }
            }
        }
        FetchOutcome::Complete
    }

    /// `DELE <n>`: mark message `number` deleted on the server.
    pub fn delete(&mut self, number: u32) -> Result<()> {
        self.simple_command("DELE", Some(&number.to_string()))
    }

    /// `QUIT` and close the transport. Never fails; problems are logged.
    ///
    /// Safe to call more than once and from any protocol state.
    pub fn quit(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        if let Err(e) = self.simple_command("QUIT", None) {
            warn!(error = %e, "QUIT failed");
        }
        if let Err(e) = self.transport.close() {
            warn!(error = %e, "Closing connection failed");
        }
        info!("Disconnected from POP host");
    }

    // ── Internals ───────────────────────────────────────────────

    /// Receive the greeting line. It is not classified.
    fn drain_greeting(&mut self) -> Result<()> {
        let n = self.read_status_line("greeting")?;
        debug!("S: {}", first_line(&self.buf[..n]));
        Ok(())
    }

    /// Receive into `self.buf` until it holds a complete line (or is full,
    /// or the peer closed after sending something). Returns the number of
    /// bytes buffered; bytes past the newline belong to a multi-line body.
    fn read_status_line(&mut self, command: &str) -> Result<usize> {
        let mut n = 0;
        loop {
            let got = self.transport.receive(&mut self.buf[n..])?;
            if got == 0 {
                if n == 0 {
                    return Err(PopError::TransportClosed {
                        command: command.to_string(),
                    });
                }
                return Ok(n);
            }
            n += got;
            if self.buf[..n].contains(&b'\n') || n == self.buf.len() {
                return Ok(n);
            }
        }
    }

    /// Send a command whose whole reply is the status line.
    fn simple_command(&mut self, verb: &str, arg: Option<&str>) -> Result<()> {
        self.command(verb, arg).map(|_| ())
    }

    /// Send `verb arg` and read the status line into `self.buf`.
    /// Returns the number of bytes buffered.
    fn command(&mut self, verb: &str, arg: Option<&str>) -> Result<usize> {
        let line = match arg {
            Some(a) => format!("{verb} {a}\r\n"),
            None => format!("{verb}\r\n"),
        };
        if verb == "PASS" {
            debug!("C: PASS <redacted>");
        } else {
            debug!("C: {}", line.trim_end());
        }
        self.transport.send(line.as_bytes())?;

        let n = self.read_status_line(verb)?;
        let reply = &self.buf[..n];
        debug!("S: {}", first_line(reply));
        match response::classify(reply) {
            Status::Ok => Ok(n),
            Status::Err => Err(PopError::protocol(verb, first_line(reply).as_bytes())),
        }
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        self.quit();
    }
}

fn first_line(reply: &[u8]) -> String {
    let end = reply.iter().position(|&b| b == b'\n').unwrap_or(reply.len());
    String::from_utf8_lossy(&reply[..end]).trim_end().to_string()
}
