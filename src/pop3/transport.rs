//! Byte-stream transports the session talks through.
//!
//! [`TcpTransport`] is the real thing. With the `test-util` feature (and
//! in unit tests) `MemoryTransport` replays a scripted list of server
//! chunks and records what was sent, for reproducing a server's exact
//! chunking.

use std::io::{Read, Write};
use std::net::{IpAddr, Shutdown, SocketAddr, TcpStream};

use dns_lookup::LookupErrorKind;
use tracing::{debug, trace};

use crate::error::{PopError, Result};

/// A blocking, ordered byte channel to the server.
pub trait Transport {
    /// Send all of `data`.
    fn send(&mut self, data: &[u8]) -> std::io::Result<()>;

    /// Receive up to `buf.len()` bytes. `Ok(0)` means the peer closed.
    fn receive(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;

    /// Close the channel. Further sends fail.
    fn close(&mut self) -> std::io::Result<()>;
}

// ── TCP ─────────────────────────────────────────────────────────

/// Plain TCP connection to a POP3 server.
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
    peer: SocketAddr,
}

impl TcpTransport {
    /// Resolve `host` and connect to the first address that accepts.
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let addrs = resolve(host)?;
        let mut last_err = None;
        for ip in addrs {
            let addr = SocketAddr::new(ip, port);
            debug!(%addr, "Connecting");
            match TcpStream::connect(addr) {
                Ok(stream) => {
                    debug!(%addr, "Connected");
                    return Ok(Self { stream, peer: addr });
                }
                Err(e) => {
                    debug!(%addr, error = %e, "Connect attempt failed");
                    last_err = Some((addr, e));
                }
            }
        }
        match last_err {
            Some((addr, source)) => Err(PopError::Connection {
                addr: addr.to_string(),
                source,
            }),
            None => Err(PopError::Resolution {
                host: host.to_string(),
                transient: false,
            }),
        }
    }

    /// Address of the server we are connected to.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

/// Look `host` up, telling a temporary resolver failure apart from a bad name.
fn resolve(host: &str) -> Result<Vec<IpAddr>> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(vec![ip]);
    }
    let iter = dns_lookup::getaddrinfo(Some(host), None, None).map_err(|e| {
        let transient = matches!(e.kind(), LookupErrorKind::Again);
        debug!(host, transient, "Host lookup failed");
        PopError::Resolution {
            host: host.to_string(),
            transient,
        }
    })?;

    let mut ips: Vec<IpAddr> = Vec::new();
    for info in iter.flatten() {
        let ip = info.sockaddr.ip();
        if !ips.contains(&ip) {
            ips.push(ip);
        }
    }
    trace!(host, ?ips, "Resolved");
    Ok(ips)
}

impl Transport for TcpTransport {
    fn send(&mut self, data: &[u8]) -> std::io::Result<()> {
        self.stream.write_all(data)?;
        self.stream.flush()
    }

    fn receive(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.stream.read(buf)
    }

    fn close(&mut self) -> std::io::Result<()> {
        match self.stream.shutdown(Shutdown::Both) {
            Err(e) if e.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }
}

// ── In-memory ───────────────────────────────────────────────────

#[cfg(any(test, feature = "test-util"))]
pub use self::memory::{sent_commands, MemoryTransport, SentLog};

#[cfg(any(test, feature = "test-util"))]
mod memory {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use super::Transport;

    /// Shared record of everything written to a [`MemoryTransport`].
    pub type SentLog = Rc<RefCell<Vec<u8>>>;

    /// Transport that hands out pre-recorded server chunks one `receive` at a
    /// time and records everything sent.
    ///
    /// A chunk larger than the caller's buffer is split; an exhausted script
    /// reads as end-of-stream.
    #[derive(Debug, Default)]
    pub struct MemoryTransport {
        chunks: VecDeque<Vec<u8>>,
        sent: SentLog,
        closed: bool,
    }

    impl MemoryTransport {
        /// Build a transport that will return `chunks` in order.
        pub fn new<I, C>(chunks: I) -> Self
        where
            I: IntoIterator<Item = C>,
            C: AsRef<[u8]>,
        {
            Self {
                chunks: chunks.into_iter().map(|c| c.as_ref().to_vec()).collect(),
                sent: SentLog::default(),
                closed: false,
            }
        }

        /// Handle on the sent-bytes log that outlives the transport.
        pub fn sent_log(&self) -> SentLog {
            Rc::clone(&self.sent)
        }

        /// Whether `close` has been called.
        pub fn is_closed(&self) -> bool {
            self.closed
        }
    }

    /// Split a sent-bytes log into command lines without their CRLF.
    pub fn sent_commands(log: &SentLog) -> Vec<String> {
        String::from_utf8_lossy(&log.borrow())
            .split("\r\n")
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }

    impl Transport for MemoryTransport {
        fn send(&mut self, data: &[u8]) -> std::io::Result<()> {
            if self.closed {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotConnected,
                    "transport closed",
                ));
            }
            self.sent.borrow_mut().extend_from_slice(data);
            Ok(())
        }

        fn receive(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let Some(mut chunk) = self.chunks.pop_front() else {
                return Ok(0);
            };
            if chunk.len() > buf.len() {
                let rest = chunk.split_off(buf.len());
                self.chunks.push_front(rest);
            }
            buf[..chunk.len()].copy_from_slice(&chunk);
            Ok(chunk.len())
        }

        fn close(&mut self) -> std::io::Result<()> {
            self.closed = true;
            Ok(())
        }
    }
}
