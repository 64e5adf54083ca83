//! File Manager MCP Server
//!
//! A Model Context Protocol server that exposes local file-management tools
//! (web page snapshots, file lookup, PDF protection, integrity checks) to
//! MCP-compliant AI agents.

pub mod error;
pub mod mcp;
pub mod transport;

pub use error::ServerError;
pub use mcp::server::FileManagerServer;
