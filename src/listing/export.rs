//! Write the mailbox listing file.
//!
//! Format: `<number>:<size> <sender> <subject>\n`, with sender and subject
//! left-justified, truncated and padded to 40 characters each.

use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{PopError, Result};
use crate::model::message::Message;
use crate::model::store::MessageStore;

/// Width of the sender and subject columns.
pub const COLUMN_WIDTH: usize = 40;

/// Format one listing line (including the trailing newline).
pub fn format_line(msg: &Message) -> String {
    format!(
        "{}:{} {:<w$.w$} {:<w$.w$}\n",
        msg.number,
        msg.size,
        msg.sender(),
        msg.subject(),
        w = COLUMN_WIDTH
    )
}

/// Write the listing for every message in `store` to `out`.
pub fn write_listing<W: Write>(store: &MessageStore, out: &mut W) -> std::io::Result<()> {
    for msg in store {
        out.write_all(format_line(msg).as_bytes())?;
    }
    out.flush()
}

/// Create (or truncate) `path` and write the listing into it.
pub fn export_listing(store: &MessageStore, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| PopError::file(path, e))?;
    let mut out = BufWriter::new(file);
    write_listing(store, &mut out).map_err(|e| PopError::file(path, e))?;
    tracing::info!(path = %path.display(), messages = store.len(), "Listing exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::message::HeaderFields;

    #[test]
    fn test_line_is_padded() {
        let mut msg = Message::new(7);
        msg.size = 1234;
        msg.headers = HeaderFields {
            sender: "a@b".into(),
            subject: "hi".into(),
        };
        let line = format_line(&msg);
        assert_eq!(line, format!("7:1234 {:<40} {:<40}\n", "a@b", "hi"));
        assert_eq!(line.len(), "7:1234 ".len() + 40 + 1 + 40 + 1);
    }

    #[test]
    fn test_line_is_truncated() {
        let mut msg = Message::new(1);
        msg.headers.sender = "s".repeat(50);
        msg.headers.subject = "t".repeat(45);
        let line = format_line(&msg);
        assert_eq!(line, format!("1:0 {} {}\n", "s".repeat(40), "t".repeat(40)));
    }

    #[test]
    fn test_write_listing_all_messages() {
        let store = MessageStore::new(3).unwrap();
        let mut out = Vec::new();
        write_listing(&store, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let numbers: Vec<&str> = text
            .lines()
            .map(|l| l.split(':').next().unwrap())
            .collect();
        assert_eq!(numbers, vec!["1", "2", "3"]);
    }
}
