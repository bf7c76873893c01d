//! MCP Server implementation for Teamleader Focus
//!
//! Protocol types, tool dispatch and the stdio transport

pub mod protocol;
mod server;
pub mod transport;

pub use protocol::*;
pub use server::{TeamleaderMcpServer, SERVER_NAME};
pub use transport::{run_stdio, serve, TransportError};
