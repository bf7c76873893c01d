//! Teamleader MCP Library
//!
//! Model Context Protocol server for the Teamleader Focus CRM API.
//! Keeps one OAuth2 access token fresh (with refresh-token rotation) and
//! exposes contacts, companies, deals, tasks, events and invoices as tools.

pub mod api;
pub mod auth;
pub mod config;
pub mod mcp;
pub mod tools;

pub use api::{ApiError, ClientError, TeamleaderClient};
pub use auth::{AuthError, TokenManager};
pub use config::{Config, ConfigError, RuntimeConfig};
pub use mcp::TeamleaderMcpServer;
