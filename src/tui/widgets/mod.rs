//! TUI widgets for rendering the review screen.

pub mod message_list;
pub mod status_bar;
