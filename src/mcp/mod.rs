//! MCP tool server
//!
//! Exposes the weather tools to external model hosts over the Model Context
//! Protocol (JSON-RPC 2.0 on stdio), bypassing the conversation loop.

pub mod protocol;
pub mod server;

pub use server::McpServer;
