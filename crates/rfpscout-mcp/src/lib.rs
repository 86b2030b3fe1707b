//! RFP Scout MCP Server
//!
//! Model Context Protocol server exposing the RFP search and statistics
//! tools to AI assistants.

pub mod protocol;
mod resources;
mod server;
pub mod tools;

pub use server::{start_server, McpServer};
