//! Core data model: per-message metadata and the fixed-size message table.

pub mod message;
pub mod store;
