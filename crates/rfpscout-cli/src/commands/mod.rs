//! CLI command handlers

pub mod chat;
pub mod schema;
pub mod search;
