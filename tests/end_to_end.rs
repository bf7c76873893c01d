//! Token refresh, API call and MCP dispatch against a mocked Teamleader

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use teamleader_mcp::mcp::{self, JsonRpcRequest};
use teamleader_mcp::{ClientError, TeamleaderClient, TeamleaderMcpServer, TokenManager};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN_PATH: &str = "/oauth2/access_token";

fn token_body(access_token: &str, refresh_token: &str) -> Value {
    json!({
        "token_type": "Bearer",
        "expires_in": 3600,
        "access_token": access_token,
        "refresh_token": refresh_token,
    })
}

fn client(server: &MockServer, auth: TokenManager) -> TeamleaderClient {
    let auth = auth.with_token_url(format!("{}{}", server.uri(), TOKEN_PATH));
    TeamleaderClient::new(Arc::new(auth), server.uri()).unwrap()
}

fn fresh_auth() -> TokenManager {
    TokenManager::new(
        "client-id".to_string(),
        "secret".to_string(),
        "refresh-1".to_string(),
    )
}

#[tokio::test]
async fn first_call_refreshes_then_uses_new_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("access-1", "refresh-2")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/widgets.list"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, fresh_auth());
    let result = assert_ok!(client.execute("widgets.list", Some(&json!({}))).await);
    assert_eq!(result, json!({ "data": [] }));
    assert_eq!(client.auth().get_refresh_token().await, "refresh-2");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].url.path(), TOKEN_PATH);
    assert_eq!(requests[1].url.path(), "/widgets.list");

    server.verify().await;
}

#[tokio::test]
async fn expiring_token_uses_rotated_refresh_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("access-2", "refresh-3")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/deals.info"))
        .and(header("authorization", "Bearer access-2"))
        .and(body_json(json!({ "id": "d-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "id": "d-1" } })))
        .expect(1)
        .mount(&server)
        .await;

    // 30 s left is inside the refresh buffer
    let auth = fresh_auth().with_access_token("access-1", Instant::now() + Duration::from_secs(30));
    let client = client(&server, auth);

    assert_ok!(client.execute("deals.info", Some(&json!({ "id": "d-1" }))).await);
    assert_eq!(client.auth().get_refresh_token().await, "refresh-3");

    server.verify().await;
}

#[tokio::test]
async fn rejected_refresh_surfaces_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/contacts.list"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server, fresh_auth());
    let err = assert_err!(client.execute("contacts.list", None).await);
    match err {
        ClientError::Auth(auth) => {
            assert_eq!(auth.status(), Some(400));
            assert!(auth.to_string().contains("invalid_grant"));
        }
        other => panic!("expected auth error, got {:?}", other),
    }
    assert_eq!(client.auth().get_refresh_token().await, "refresh-1");

    server.verify().await;
}

#[tokio::test]
async fn tools_call_over_stdio_stream() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("access-1", "refresh-2")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/contacts.update"))
        .and(header("authorization", "Bearer access-1"))
        .and(body_json(json!({ "id": "c-1", "first_name": "Ada" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/invoices.info"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string(r#"{"errors":[{"title":"Not found"}]}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mcp_server = TeamleaderMcpServer::new(Arc::new(client(&server, fresh_auth())));

    let (client_end, server_end) = tokio::io::duplex(1 << 20);
    let (server_read, server_write) = tokio::io::split(server_end);
    let task = tokio::spawn(mcp::serve(mcp_server, server_read, server_write));

    let input = [
        json!({
            "jsonrpc": "2.0", "id": 1, "method": "tools/call",
            "params": { "name": "teamleader_update_contact",
                        "arguments": { "id": "c-1", "first_name": "Ada" } }
        }),
        json!({
            "jsonrpc": "2.0", "id": 2, "method": "tools/call",
            "params": { "name": "teamleader_get_invoice", "arguments": { "id": "i-9" } }
        }),
    ]
    .iter()
    .map(|v| format!("{}\n", v))
    .collect::<String>();

    let (mut client_read, mut client_write) = tokio::io::split(client_end);
    client_write.write_all(input.as_bytes()).await.unwrap();
    client_write.shutdown().await.unwrap();

    assert_ok!(task.await.unwrap());

    let mut output = String::new();
    client_read.read_to_string(&mut output).await.unwrap();
    let responses: Vec<Value> = output.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(responses.len(), 2);

    let by_id = |id: i64| {
        responses
            .iter()
            .find(|r| r["id"] == id)
            .map(|r| r["result"].clone())
            .unwrap()
    };

    let updated = by_id(1);
    assert!(updated.get("isError").is_none());
    let text: Value = serde_json::from_str(updated["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(text, json!({ "success": true, "message": "Contact c-1 updated" }));

    let missing = by_id(2);
    assert_eq!(missing["isError"], true);
    let text = missing["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("Error: Teamleader API error [invoices.info]: 404"));
    assert!(text.contains(r#"{"errors":[{"title":"Not found"}]}"#));

    server.verify().await;
}

#[tokio::test]
async fn handle_request_lists_tools_without_network() {
    let server = MockServer::start().await;
    let mcp_server = TeamleaderMcpServer::new(Arc::new(client(&server, fresh_auth())));

    let request: JsonRpcRequest =
        serde_json::from_value(json!({ "jsonrpc": "2.0", "id": "a", "method": "tools/list" }))
            .unwrap();
    let response = mcp_server.handle_request(request).await.unwrap();

    assert_eq!(response.id, Some(json!("a")));
    let tools = response.result.unwrap();
    assert_eq!(tools["tools"].as_array().unwrap().len(), 19);
    assert!(server.received_requests().await.unwrap().is_empty());
}
