//! Read a listing file back and delete the messages it names.
//!
//! Each line starts with the message number (at most five digits), a colon
//! and the size. Everything after the size is ignored, so an edited export
//! file works as input. A message is only deleted if its current size
//! matches the one on the line, which protects against deleting the wrong
//! message when numbering changed since the listing was written.

use std::io::BufRead;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{PopError, Result};
use crate::model::store::MessageStore;
use crate::pop3::session::Session;
use crate::pop3::transport::Transport;

/// Only the first this-many bytes of a line are looked at; anything past
/// that is treated as the wrapped tail of an over-long line and skipped.
pub const LINE_FRAGMENT: usize = 499;

/// Longest accepted message number, in digits.
const MAX_NUMBER_DIGITS: usize = 5;

/// A line whose size did not match the mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeMismatch {
    pub number: u32,
    pub listed_size: u64,
    pub actual_size: u64,
}

impl std::fmt::Display for SizeMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Wrong message size, skipping message {} ({}<=>{})",
            self.number, self.listed_size, self.actual_size
        )
    }
}

/// Outcome of an import run.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Messages the server accepted `DELE` for, in file order.
    pub deleted: Vec<u32>,
    /// Lines skipped because the size did not match.
    pub mismatched: Vec<SizeMismatch>,
    /// Messages whose `DELE` was rejected, with the error text.
    pub failed: Vec<(u32, String)>,
}

/// Parse `<number>:<size>` from the start of a line.
///
/// Returns `None` for lines that do not start with digits, and for a zero
/// number or size.
pub fn parse_line(line: &[u8]) -> Option<(u32, u64)> {
    let line = &line[..line.len().min(LINE_FRAGMENT)];
    let digits = line
        .iter()
        .take(MAX_NUMBER_DIGITS)
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 || line.get(digits) != Some(&b':') {
        return None;
    }
    let number: u32 = std::str::from_utf8(&line[..digits]).ok()?.parse().ok()?;

    let rest = &line[digits + 1..];
    let rest = &rest[rest.iter().take_while(|b| **b == b' ').count()..];
    let size_len = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    let size: u64 = std::str::from_utf8(&rest[..size_len]).ok()?.parse().ok()?;

    if number == 0 || size == 0 {
        return None;
    }
    Some((number, size))
}

/// Delete every message listed in `reader` whose size matches `store`.
///
/// Numbers that are not in the mailbox are skipped silently. A rejected
/// `DELE` is recorded and does not stop the run.
pub fn import_listing<R: BufRead, T: Transport>(
    mut reader: R,
    store: &MessageStore,
    session: &mut Session<T>,
) -> std::io::Result<ImportReport> {
    let mut report = ImportReport::default();
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        let Some((number, listed_size)) = parse_line(&line) else {
            continue;
        };
        let Some(msg) = store.get(number) else {
            continue;
        };
        if msg.size != listed_size {
            let mismatch = SizeMismatch {
                number,
                listed_size,
                actual_size: msg.size,
            };
            warn!("{mismatch}");
            report.mismatched.push(mismatch);
            continue;
        }
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
        mismatched = report.mismatched.len(),
        failed = report.failed.len(),
        "Import finished"
    );
    Ok(report)
}

/// Open `path` and run [`import_listing`] on it.
pub fn import_file<T: Transport>(
    path: &Path,
    store: &MessageStore,
    session: &mut Session<T>,
) -> Result<ImportReport> {
    let file = std::fs::File::open(path).map_err(|e| PopError::file(path, e))?;
    import_listing(std::io::BufReader::new(file), store, session)
        .map_err(|e| PopError::file(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export_line() {
        let line = format!("12:3456 {:<40} {:<40}\n", "a@b", "subject");
        assert_eq!(parse_line(line.as_bytes()), Some((12, 3456)));
    }

    #[test]
    fn test_parse_rejects_junk() {
        assert_eq!(parse_line(b"\n"), None);
        assert_eq!(parse_line(b"# comment\n"), None);
        assert_eq!(parse_line(b"12 3456\n"), None);
        assert_eq!(parse_line(b"0:100\n"), None);
        assert_eq!(parse_line(b"3:0\n"), None);
        assert_eq!(parse_line(b"3:\n"), None);
    }

    #[test]
    fn test_parse_number_digit_limit() {
        assert_eq!(parse_line(b"99999:10\n"), Some((99999, 10)));
        assert_eq!(parse_line(b"100000:10\n"), None);
    }

    #[test]
    fn test_parse_ignores_wrapped_tail() {
        let mut line = b"4:250 ".to_vec();
        line.extend(std::iter::repeat(b'x').take(2000));
        line.push(b'\n');
        assert_eq!(parse_line(&line), Some((4, 250)));
    }
}
