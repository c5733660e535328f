//! Centralized error types for popcheck.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the popcheck library.
#[derive(Error, Debug)]
pub enum PopError {
    /// The POP host name could not be resolved.
    ///
    /// `transient` is set when the resolver asked us to try again later.
    #[error("{}", resolution_message(.host, .transient))]
    Resolution { host: String, transient: bool },

    /// Socket creation or connect failed.
    #[error("Socket connection to {addr} failed: {source}")]
    Connection {
        addr: String,
        source: std::io::Error,
    },

    /// The server answered `-ERR`, or sent a reply we could not make sense of.
    #[error("Bad {command} command response: {reply}")]
    Protocol { command: String, reply: String },

    /// The server closed the connection while a reply was expected.
    #[error("Connection closed by server while waiting for {command} response")]
    TransportClosed { command: String },

    /// A listing file could not be opened, read or written.
    #[error("{path}: {source}")]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The message table could not be allocated.
    #[error("Out of memory while allocating buffers for {0} messages")]
    Allocation(usize),

    /// Any other I/O failure (socket send/receive, spool file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for `Result<T, PopError>`.
pub type Result<T> = std::result::Result<T, PopError>;

fn resolution_message(host: &str, transient: &bool) -> String {
    if *transient {
        format!("Unable to locate the POP Host '{host}', try again later")
    } else {
        format!("The POP Host '{host}' is invalid")
    }
}

impl PopError {
    /// Create a `File` variant from a path and an `io::Error`.
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }

    /// Create a `Protocol` variant, trimming the trailing CRLF off the reply.
    pub fn protocol(command: &str, reply: &[u8]) -> Self {
        Self::Protocol {
            command: command.to_string(),
            reply: String::from_utf8_lossy(reply).trim_end().to_string(),
        }
    }

    /// Whether this error came from the server rejecting a command.
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_messages() {
        let transient = PopError::Resolution {
            host: "pop.example.com".into(),
            transient: true,
        };
        assert!(transient.to_string().contains("try again later"));

        let permanent = PopError::Resolution {
            host: "nowhere.invalid".into(),
            transient: false,
        };
        assert!(permanent.to_string().contains("is invalid"));
    }

    #[test]
    fn test_protocol_trims_reply() {
        let err = PopError::protocol("DELE", b"-ERR no such message\r\n");
        assert_eq!(
            err.to_string(),
            "Bad DELE command response: -ERR no such message"
        );
        assert!(err.is_protocol());
    }
}
