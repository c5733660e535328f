//! Streaming `From:` / `Subject:` extractor for `TOP` replies.
//!
//! A `TOP` reply arrives in whatever pieces the socket hands us, so a
//! header name, its value or even a CRLF may be split across two reads.
//! [`HeaderExtractor`] keeps its position between calls to
//! [`HeaderExtractor::scan`] and picks up exactly where the previous chunk
//! ended. Nothing is ever re-scanned.
//!
//! Only the first occurrence of each header is captured. A value continues
//! over folded lines (a line starting with a space) and is cut off after
//! [`HEADER_VALUE_MAX`] bytes. Values are collected as raw bytes and
//! decoded by [`RawHeaderFields::decode`] once the reply is complete.

use crate::model::message::{RawHeaderFields, HEADER_VALUE_MAX};

const FROM_TAG: &[u8] = b"From:";
const SUBJECT_TAG: &[u8] = b"Subject:";

/// Where we are with respect to one header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    /// Header not seen yet.
    Searching,
    /// Header name matched; value bytes are being copied.
    Copying,
    /// Value finished (end of line, or length cap reached).
    Done,
}

/// Per-header state: how far the tag has matched and how much was copied.
#[derive(Debug, Clone, Copy)]
struct Tracker {
    tag: &'static [u8],
    matched: usize,
    capture: Capture,
    written: usize,
}

impl Tracker {
    const fn new(tag: &'static [u8]) -> Self {
        Self {
            tag,
            matched: 0,
            capture: Capture::Searching,
            written: 0,
        }
    }

    fn reset(&mut self) {
        *self = Self::new(self.tag);
    }

    /// Handle one byte while copying. `line_start` is true when the byte
    /// opens a new line. Returns true if the byte folded the line.
    ///
    /// Spaces and tabs between the colon and the first value byte are
    /// dropped, so `Subject:  hi` and `Subject:hi` both capture `hi` and the
    /// separator does not eat into the cap. Every later byte except CR/LF
    /// is kept.
    fn copy_byte(&mut self, byte: u8, line_start: bool, out: &mut Vec<u8>) -> bool {
        if line_start {
            if byte == b' ' {
                self.push(byte, out);
                return true;
            }
            self.capture = Capture::Done;
            return false;
        }
        if byte != b'\r' && byte != b'\n' {
            if self.written == 0 && (byte == b' ' || byte == b'\t') {
                return false;
            }
            self.push(byte, out);
        }
        false
    }

    fn push(&mut self, byte: u8, out: &mut Vec<u8>) {
        // A fold before any value byte adds nothing.
        if self.written == 0 && byte == b' ' {
            return;
        }
        out.push(byte);
        self.written += 1;
        if self.written >= HEADER_VALUE_MAX {
            self.capture = Capture::Done;
        }
    }

    /// Try to advance the tag match with `byte`. Returns true on a full match.
    fn advance(&mut self, byte: u8) -> Option<bool> {
        if self.capture != Capture::Searching
            || !byte.eq_ignore_ascii_case(&self.tag[self.matched])
        {
            return None;
        }
        self.matched += 1;
        if self.matched == self.tag.len() {
            self.matched = 0;
            self.capture = Capture::Copying;
            return Some(true);
        }
        Some(false)
    }
}

/// Resumable scanner for the `From:` and `Subject:` headers.
///
/// One extractor is owned by each [`Session`](super::session::Session) and
/// reset at the start of every `TOP` retrieval.
#[derive(Debug, Clone)]
pub struct HeaderExtractor {
    from: Tracker,
    subject: Tracker,
    /// The previous byte was `\n` (or nothing has been scanned yet).
    line_start: bool,
}

impl Default for HeaderExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderExtractor {
    /// A freshly reset extractor.
    pub fn new() -> Self {
        Self {
            from: Tracker::new(FROM_TAG),
            subject: Tracker::new(SUBJECT_TAG),
            line_start: true,
        }
    }

    /// Return to the initial state. The next byte scanned counts as the
    /// start of a line.
    pub fn reset(&mut self) {
        self.from.reset();
        self.subject.reset();
        self.line_start = true;
    }

    /// Whether both headers have been fully captured.
    pub fn is_complete(&self) -> bool {
        self.from.capture == Capture::Done && self.subject.capture == Capture::Done
    }

    /// Scan `chunk`, writing discovered values into `target`.
    ///
    /// With `reset` set the extractor (but not `target`) is reset first;
    /// otherwise scanning resumes where the previous call stopped.
    pub fn scan(&mut self, chunk: &[u8], reset: bool, target: &mut RawHeaderFields) {
        if reset {
            self.reset();
        }

        for &byte in chunk {
            if self.from.capture == Capture::Copying
                && self.from.copy_byte(byte, self.line_start, &mut target.sender)
            {
                self.line_start = false;
            }
            if self.subject.capture == Capture::Copying
                && self.subject.copy_byte(byte, self.line_start, &mut target.subject)
            {
                self.line_start = false;
            }

            if self.line_start {
                self.match_tag(byte);
            }

            if byte == b'\n' {
                self.line_start = true;
            }
        }
    }

    /// Compare a start-of-line byte against the tags. The two tags compete:
    /// once one has partial progress the other is not tried.
    fn match_tag(&mut self, byte: u8) {
        let outcome = if self.subject.matched == 0 {
            self.from.advance(byte)
        } else {
            None
        };
        let outcome = match outcome {
            Some(done) => Some(done),
            None if self.from.matched == 0 => self.subject.advance(byte),
            None => None,
        };

        match outcome {
            // Full match: copying starts with the next byte.
            Some(true) => self.line_start = false,
            // Partial match: stay at "start of line" for the next tag byte.
            Some(false) => {}
            None => {
                self.line_start = false;
                self.from.matched = 0;
                self.subject.matched = 0;
            }
        }
    }
}
