//! Per-message metadata.

/// Maximum number of bytes kept from a sender or subject value on the wire.
pub const HEADER_VALUE_MAX: usize = 50;

/// Envelope fields pulled out of a message's header block, decoded.
///
/// Both values stay empty when the header was not found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFields {
    /// Value of the first `From:` header.
    pub sender: String,
    /// Value of the first `Subject:` header.
    pub subject: String,
}

/// Header values exactly as they came off the wire, at most
/// [`HEADER_VALUE_MAX`] bytes each.
///
/// Filled chunk by chunk while a `TOP` reply streams in and decoded once
/// the reply is complete, so a multi-byte character split between two
/// reads decodes the same as an unsplit one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawHeaderFields {
    pub sender: Vec<u8>,
    pub subject: Vec<u8>,
}

impl RawHeaderFields {
    /// Decode both values.
    pub fn decode(&self) -> HeaderFields {
        HeaderFields {
            sender: decode_header_bytes(&self.sender),
            subject: decode_header_bytes(&self.subject),
        }
    }
}

/// Decode raw header bytes to a string.
///
/// Tries UTF-8 first, then falls back to Windows-1252 (which accepts every
/// byte). A UTF-8 value cut off by the length cap in the middle of a
/// character keeps its complete characters.
fn decode_header_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(e) if e.error_len().is_none() && bytes.len() >= HEADER_VALUE_MAX => {
            String::from_utf8_lossy(&bytes[..e.valid_up_to()]).into_owned()
        }
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Metadata for a single message on the server.
///
/// Bodies are never downloaded; only the size reported by `LIST` and the
/// headers returned by `TOP <n> 0` are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    /// Server message number (1-based, stable for the session).
    pub number: u32,

    /// Size in bytes as reported by `LIST`.
    pub size: u64,

    /// Sender and subject.
    pub headers: HeaderFields,

    /// Whether the operator marked this message for deletion.
    pub marked_for_deletion: bool,
}

impl Message {
    /// Create an empty entry for message `number`.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            ..Self::default()
        }
    }

    /// The `From:` value (possibly empty).
    pub fn sender(&self) -> &str {
        &self.headers.sender
    }

    /// The `Subject:` value (possibly empty).
    pub fn subject(&self) -> &str {
        &self.headers.subject
    }

    /// One-character deletion indicator used by the list and the listing file.
    pub fn deletion_flag(&self) -> char {
        if self.marked_for_deletion {
            'D'
        } else {
            ' '
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_subject(bytes: &[u8]) -> String {
        RawHeaderFields {
            subject: bytes.to_vec(),
            ..Default::default()
        }
        .decode()
        .subject
    }

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_subject("café ☕".as_bytes()), "café ☕");
    }

    #[test]
    fn test_decode_windows_1252_fallback() {
        // 0x80 is the euro sign in Windows-1252 and invalid as UTF-8.
        assert_eq!(decode_subject(b"caf\xe9 \x80 5"), "café € 5");
    }

    #[test]
    fn test_utf8_cut_by_cap_keeps_whole_chars() {
        let mut bytes = vec![b'a'; HEADER_VALUE_MAX - 1];
        bytes.push(0xC3); // first half of "é"
        assert_eq!(decode_subject(&bytes), "a".repeat(HEADER_VALUE_MAX - 1));
    }

    #[test]
    fn test_short_value_with_stray_lead_byte_is_1252() {
        assert_eq!(decode_subject(b"\xc3"), "Ã");
    }

    #[test]
    fn test_empty_stays_empty() {
        assert_eq!(RawHeaderFields::default().decode(), HeaderFields::default());
    }
}
