//! MCP Server implementation for Teamleader Focus
//!
//! Exposes contacts, companies, deals, tasks, events and invoices as tools

use crate::api::TeamleaderClient;
use crate::mcp::protocol::*;
use crate::tools::{self, Args};
use serde_json::Value;
use std::sync::Arc;

/// Server name reported in `initialize`
pub const SERVER_NAME: &str = "teamleader";

/// MCP Server for Teamleader Focus
#[derive(Clone)]
pub struct TeamleaderMcpServer {
    client: Arc<TeamleaderClient>,
}

impl TeamleaderMcpServer {
    /// Create a new MCP server instance
    pub fn new(client: Arc<TeamleaderClient>) -> Self {
        Self { client }
    }

    /// Get list of available tools
    pub fn get_tools(&self) -> Vec<Tool> {
        tools::definitions()
    }

    /// Handle a tool call
    pub async fn call_tool(&self, name: &str, args: &Args) -> CallToolResult {
        let call = match tools::resolve(name, args) {
            Some(Ok(call)) => call,
            Some(Err(e)) => return CallToolResult::error(e.to_string()),
            None => return CallToolResult::error(format!("Unknown tool: {}", name)),
        };

        tracing::debug!(tool = name, operation = call.operation, "Calling tool");

        match self.client.execute(call.operation, Some(&call.payload)).await {
            Ok(result) => CallToolResult::text(call.reply.render(&result)),
            Err(e) => {
                tracing::warn!(tool = name, "Tool call failed: {}", e);
                CallToolResult::error(format!("Error: {}", e))
            }
        }
    }

    /// Dispatch one JSON-RPC request. Returns `None` for notifications.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            tracing::debug!("Notification: {}", request.method);
            return None;
        }

        let id = request.id.clone();

        let response = match request.method.as_str() {
            "initialize" => {
                let result = InitializeResult {
                    protocol_version: PROTOCOL_VERSION.to_string(),
                    capabilities: ServerCapabilities {
                        tools: Some(ToolsCapability {
                            list_changed: Some(false),
                        }),
                    },
                    server_info: ServerInfo {
                        name: SERVER_NAME.to_string(),
                        version: env!("CARGO_PKG_VERSION").to_string(),
                    },
                };
                success(id, &result)
            }

            "tools/list" => success(id, &ListToolsResult { tools: self.get_tools() }),

            "tools/call" => {
                let params: CallToolParams = match request.params.map(serde_json::from_value) {
                    Some(Ok(params)) => params,
                    Some(Err(e)) => {
                        return Some(JsonRpcResponse::error(
                            id,
                            INVALID_PARAMS,
                            &format!("Invalid params: {}", e),
                        ));
                    }
                    None => {
                        return Some(JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params"));
                    }
                };

                let args = params.arguments.unwrap_or_default();
                let result = self.call_tool(&params.name, &args).await;
                success(id, &result)
            }

            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),

            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                &format!("Method not found: {}", request.method),
            ),
        };

        Some(response)
    }
}

fn success<T: serde::Serialize>(id: Option<Value>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, &format!("Internal error: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenManager;
    use serde_json::json;

    fn offline_server() -> TeamleaderMcpServer {
        let auth = TokenManager::new(
            "client-id".to_string(),
            "secret".to_string(),
            "refresh".to_string(),
        )
        .with_token_url("http://127.0.0.1:9/oauth2/access_token");
        let client = TeamleaderClient::new(Arc::new(auth), "http://127.0.0.1:9").unwrap();
        TeamleaderMcpServer::new(Arc::new(client))
    }

    fn request(value: Value) -> JsonRpcRequest {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let server = offline_server();
        let response = server
            .handle_request(request(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": {}
            })))
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
        assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let server = offline_server();
        let response = server
            .handle_request(request(json!({
                "jsonrpc": "2.0",
                "method": "notifications/initialized"
            })))
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_tools_list() {
        let server = offline_server();
        let response = server
            .handle_request(request(json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" })))
            .await
            .unwrap();

        let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();
        assert_eq!(tools.len(), 19);
        assert!(tools.iter().any(|t| t["name"] == "teamleader_create_invoice"));
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let server = offline_server();
        let response = server
            .handle_request(request(json!({ "jsonrpc": "2.0", "id": 3, "method": "resources/list" })))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_tools_call_without_params() {
        let server = offline_server();
        let response = server
            .handle_request(request(json!({ "jsonrpc": "2.0", "id": 4, "method": "tools/call" })))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_tool_error() {
        let server = offline_server();
        let result = server.call_tool("teamleader_list_widgets", &Args::new()).await;
        assert!(result.is_error());
        assert_eq!(result.content[0].text, "Unknown tool: teamleader_list_widgets");
    }

    #[tokio::test]
    async fn test_argument_errors_skip_network() {
        let server = offline_server();
        let result = server.call_tool("teamleader_get_deal", &Args::new()).await;
        assert!(result.is_error());
        assert_eq!(result.content[0].text, "Missing required parameter: id");
    }

    #[tokio::test]
    async fn test_auth_failure_becomes_tool_error() {
        let server = offline_server();
        let mut args = Args::new();
        args.insert("id".to_string(), json!("d-1"));

        let result = server.call_tool("teamleader_get_deal", &args).await;
        assert!(result.is_error());
        assert!(result.content[0].text.starts_with("Error: "));
    }
}
