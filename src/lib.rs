//! `popcheck`: check and clean up a POP3 mailbox from the terminal.
//!
//! This crate provides the POP3 session engine, the streaming header
//! extractor used on `TOP` replies, the fixed-size message table, the
//! listing export/import format and the interactive review screen.

pub mod cancel;
pub mod config;
pub mod error;
pub mod listing;
pub mod model;
pub mod pop3;
pub mod tui;
