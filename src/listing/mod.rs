//! Plain-text listing of the mailbox, for review outside the terminal UI.
//!
//! `export` writes one line per message; the operator deletes the lines of
//! messages to keep, and `import` feeds the remaining lines back to delete
//! those messages.

pub mod export;
pub mod import;
