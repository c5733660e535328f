//! POP3 client: transport, session engine, reply grammars and the
//! streaming header extractor.

pub mod headers;
pub mod response;
pub mod session;
pub mod transport;

pub use session::{Credentials, FetchOutcome, Session};
pub use transport::{TcpTransport, Transport};
