//! Teamleader API client module
//!
//! Every Teamleader Focus operation is a `POST <base>/<operation>` with a
//! JSON body and bearer auth, e.g. `POST /contacts.list`.

use crate::auth::{AuthError, TokenManager};
use crate::config::RuntimeConfig;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Default Teamleader Focus API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.focus.teamleader.eu";

/// A Teamleader operation answered with a non-success status
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Teamleader API error [{operation}]: {status} {status_text} - {body}")]
pub struct ApiError {
    pub operation: String,
    pub status: u16,
    pub status_text: String,
    /// Raw response body, exactly as received
    pub body: String,
}

/// Errors returned by [`TeamleaderClient::execute`]
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// HTTP client used for both the token endpoint and the API
pub fn http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("teamleader-mcp/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Authenticated client for the Teamleader Focus API
#[derive(Debug, Clone)]
pub struct TeamleaderClient {
    auth: Arc<TokenManager>,
    base_url: String,
    http_client: Client,
}

impl TeamleaderClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `auth` - Token manager shared by every request
    /// * `base_url` - API root, e.g. "https://api.focus.teamleader.eu"
    pub fn new(auth: Arc<TokenManager>, base_url: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self::with_http_client(auth, base_url, http_client()?))
    }

    /// Create a client on an existing connection pool
    pub fn with_http_client(
        auth: Arc<TokenManager>,
        base_url: impl Into<String>,
        http_client: Client,
    ) -> Self {
        Self {
            auth,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        }
    }

    /// Build the token manager and the client from validated configuration.
    /// Token refreshes and API calls share one connection pool.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self, ClientError> {
        let http_client = http_client()?;

        let auth = TokenManager::new(
            config.client_id.clone(),
            config.client_secret.clone(),
            config.refresh_token.clone(),
        )
        .with_token_url(config.token_url.clone())
        .with_http_client(http_client.clone());

        Ok(Self::with_http_client(
            Arc::new(auth),
            config.api_base_url.clone(),
            http_client,
        ))
    }

    /// API root without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Token manager backing this client
    pub fn auth(&self) -> &Arc<TokenManager> {
        &self.auth
    }

    /// Perform one authenticated call to a named operation.
    ///
    /// Returns the parsed JSON body, or `{}` for `204 No Content`. Nothing
    /// is retried.
    pub async fn execute(
        &self,
        operation: &str,
        payload: Option<&Value>,
    ) -> Result<Value, ClientError> {
        let token = self.auth.get_access_token().await?;
        let url = format!("{}/{}", self.base_url, operation);

        tracing::debug!("POST {}", url);

        let mut request = self
            .http_client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");

        if let Some(payload) = payload {
            let body = serde_json::to_vec(payload)
                .map_err(|e| ClientError::Parse(format!("Failed to encode payload: {}", e)))?;
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("{} failed with {}", operation, status);
            return Err(ApiError {
                operation: operation.to_string(),
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            }
            .into());
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Object(Default::default()));
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Object(Default::default()));
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            ClientError::Parse(format!("Failed to parse {} response: {}", operation, e))
        })
    }
}
