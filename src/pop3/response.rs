//! Reply classification and the two multi-line grammars (`LIST`, `TOP`).

use std::io::BufRead;

use crate::model::store::MessageStore;

/// Multi-line replies end with a line holding a single dot.
pub const TERMINATOR: &[u8] = b"\r\n.\r\n";

/// An empty multi-line body can arrive as just the dot line.
pub const BARE_TERMINATOR: &[u8] = b".\r\n";

/// Status of a single-line reply (or the first line of a multi-line one).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Err,
}

/// Classify the first reply chunk. Only `-ERR` counts as failure.
pub fn classify(reply: &[u8]) -> Status {
    if reply.starts_with(b"-ERR") {
        Status::Err
    } else {
        Status::Ok
    }
}

/// Parse the message count out of `+OK <count> <size>`.
pub fn parse_stat(reply: &[u8]) -> Option<u32> {
    let text = std::str::from_utf8(reply).ok()?;
    let mut parts = text.split_whitespace();
    if parts.next()? != "+OK" {
        return None;
    }
    parts.next()?.parse().ok()
}

/// Watches a multi-line reply chunk by chunk for its terminating dot line.
///
/// The last few bytes of earlier chunks are remembered so a terminator
/// that straddles two reads is still recognised.
#[derive(Debug, Default)]
pub struct TerminatorScanner {
    tail: Vec<u8>,
}

impl TerminatorScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk. Returns true once the reply is complete.
    pub fn feed(&mut self, chunk: &[u8]) -> bool {
        if chunk == BARE_TERMINATOR {
            return true;
        }
        self.tail.extend_from_slice(chunk);
        let keep = TERMINATOR.len();
        if self.tail.len() > keep {
            self.tail.drain(..self.tail.len() - keep);
        }
        self.tail.ends_with(TERMINATOR)
    }
}

/// Fill message sizes from a spooled `LIST` reply.
///
/// The first line is the status line. Each following line is
/// `<number> <size>`; sizes go into the store in the order the server
/// listed them. Malformed lines are skipped, parsing stops at the dot line,
/// and entries without a line keep size 0. Returns how many sizes were set.
pub fn parse_list_body<R: BufRead>(reader: R, store: &mut MessageStore) -> std::io::Result<usize> {
    let mut lines = reader.split(b'\n');
    // Status line.
    if lines.next().transpose()?.is_none() {
        return Ok(0);
    }

    let mut slot = 0usize;
    for line in lines {
        let line = line?;
        let line = trim_cr(&line);
        if line == b"." {
            break;
        }
        let Some(size) = parse_list_line(line) else {
            tracing::debug!(line = %String::from_utf8_lossy(line), "Skipping malformed LIST line");
            continue;
        };
        let Some(msg) = store.at_mut(slot) else {
            break;
        };
        msg.size = size;
        slot += 1;
    }
    Ok(slot)
}

/// `<number> <size>` → size.
fn parse_list_line(line: &[u8]) -> Option<u64> {
    let text = std::str::from_utf8(line).ok()?;
    let mut parts = text.split_whitespace();
    parts.next()?.parse::<u32>().ok()?;
    parts.next()?.parse().ok()
}

fn trim_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify(b"+OK 2 320\r\n"), Status::Ok);
        assert_eq!(classify(b"-ERR no such message\r\n"), Status::Err);
        assert_eq!(classify(b"1 120\r\n"), Status::Ok);
    }

    #[test]
    fn test_parse_stat() {
        assert_eq!(parse_stat(b"+OK 3 350\r\n"), Some(3));
        assert_eq!(parse_stat(b"+OK 0 0\r\n"), Some(0));
        assert_eq!(parse_stat(b"+OK\r\n"), None);
        assert_eq!(parse_stat(b"+OK many\r\n"), None);
        assert_eq!(parse_stat(b"-ERR locked\r\n"), None);
    }

    #[test]
    fn test_terminator_in_same_chunk() {
        let mut t = TerminatorScanner::new();
        assert!(t.feed(b"+OK\r\nFrom: a\r\n\r\n.\r\n"));
    }

    #[test]
    fn test_terminator_in_own_chunk() {
        let mut t = TerminatorScanner::new();
        assert!(!t.feed(b"+OK\r\nFrom: a\r\n"));
        assert!(t.feed(b".\r\n"));
    }

    #[test]
    fn test_terminator_straddles_chunks() {
        let mut t = TerminatorScanner::new();
        assert!(!t.feed(b"+OK\r\nSubject: x\r\n\r"));
        assert!(!t.feed(b"\n."));
        assert!(t.feed(b"\r\n"));
    }

    #[test]
    fn test_empty_body_after_status_line() {
        let mut t = TerminatorScanner::new();
        assert!(t.feed(b"+OK\r\n.\r\n"));
    }

    #[test]
    fn test_dot_inside_body_is_not_terminator() {
        let mut t = TerminatorScanner::new();
        assert!(!t.feed(b"+OK\r\nSubject: ends with.\r\n"));
        assert!(!t.feed(b"..stuffed\r\n"));
    }

    #[test]
    fn test_parse_list_body() {
        let mut store = MessageStore::new(2).unwrap();
        let body = b"+OK 2 messages\r\n1 120\r\n2 340\r\n.\r\n";
        let n = parse_list_body(&body[..], &mut store).unwrap();
        assert_eq!(n, 2);
        let sizes: Vec<u64> = store.iter().map(|m| m.size).collect();
        assert_eq!(sizes, vec![120, 340]);
    }

    #[test]
    fn test_parse_list_body_short_and_malformed() {
        let mut store = MessageStore::new(3).unwrap();
        let body = b"+OK\r\n1 120\r\ngarbage\r\n2 340\r\n.\r\n9 999\r\n";
        let n = parse_list_body(&body[..], &mut store).unwrap();
        assert_eq!(n, 2);
        let sizes: Vec<u64> = store.iter().map(|m| m.size).collect();
        assert_eq!(sizes, vec![120, 340, 0]);
    }

    #[test]
    fn test_parse_list_body_more_lines_than_slots() {
        let mut store = MessageStore::new(1).unwrap();
        let body = b"+OK\r\n1 10\r\n2 20\r\n.\r\n";
        assert_eq!(parse_list_body(&body[..], &mut store).unwrap(), 1);
        assert_eq!(store.get(1).unwrap().size, 10);
    }
}
