//! Teamleader tool definitions
//!
//! Each tool maps MCP arguments onto one Teamleader operation and its JSON
//! payload. No network access happens here; [`crate::mcp::TeamleaderMcpServer`]
//! executes the resulting [`ToolCall`].

pub mod args;
mod companies;
mod contacts;
mod deals;
mod events;
mod invoices;
mod tasks;

pub use args::{ArgError, Args};

use crate::mcp::protocol::Tool;
use serde_json::{json, Value};

/// How a successful operation result is presented to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Pretty-printed API response
    Result,
    /// Fixed acknowledgement; update operations return no useful body
    Updated(String),
}

impl Reply {
    pub fn updated(entity: &str, id: &str) -> Self {
        Reply::Updated(format!("{} {} updated", entity, id))
    }

    /// Render the operation result as tool output text
    pub fn render(&self, result: &Value) -> String {
        match self {
            Reply::Result => {
                serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string())
            }
            Reply::Updated(message) => json!({ "success": true, "message": message }).to_string(),
        }
    }
}

/// A resolved tool invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub operation: &'static str,
    pub payload: Value,
    pub reply: Reply,
}

impl ToolCall {
    pub fn new(operation: &'static str, payload: impl Into<Value>) -> Self {
        Self {
            operation,
            payload: payload.into(),
            reply: Reply::Result,
        }
    }

    pub fn with_reply(mut self, reply: Reply) -> Self {
        self.reply = reply;
        self
    }
}

/// All tool definitions, grouped by entity
pub fn definitions() -> Vec<Tool> {
    let mut tools = contacts::definitions();
    tools.extend(companies::definitions());
    tools.extend(deals::definitions());
    tools.extend(tasks::definitions());
    tools.extend(events::definitions());
    tools.extend(invoices::definitions());
    tools
}

/// Resolve a tool name and its arguments into an operation call.
///
/// Returns `None` for unknown tool names.
pub fn resolve(name: &str, args: &Args) -> Option<Result<ToolCall, ArgError>> {
    contacts::resolve(name, args)
        .or_else(|| companies::resolve(name, args))
        .or_else(|| deals::resolve(name, args))
        .or_else(|| tasks::resolve(name, args))
        .or_else(|| events::resolve(name, args))
        .or_else(|| invoices::resolve(name, args))
}

#[cfg(test)]
pub(crate) fn test_args(value: Value) -> Args {
    match value {
        Value::Object(map) => map.into_iter().collect(),
        other => panic!("tool arguments must be an object, got {other}"),
    }
}
