//! Teamleader OAuth2 authentication module
//!
//! Implements the refresh-token grant for Teamleader Focus. The provider
//! rotates refresh tokens, so every successful refresh may replace the
//! refresh token this process started with.

use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

/// Default Teamleader token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://focus.teamleader.eu/oauth2/access_token";

/// Tokens are treated as expired this long before the server-stated expiry
pub const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Failed to refresh Teamleader token: {status} {status_text} - {body}")]
    RefreshRejected {
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Token parse error: {0}")]
    ParseError(String),
}

impl AuthError {
    /// HTTP status returned by the token endpoint, if it answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::RefreshRejected { status, .. } => Some(*status),
            AuthError::HttpError(e) => e.status().map(|s| s.as_u16()),
            AuthError::ParseError(_) => None,
        }
    }
}

/// Token response from the Teamleader token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
    #[serde(default)]
    refresh_token: Option<String>,
    #[allow(dead_code)]
    #[serde(default)]
    token_type: Option<String>,
}

/// Mutable half of the credentials. Kept in one struct so a refresh
/// replaces the access token, its expiry and the refresh token together.
#[derive(Debug, Clone)]
struct CredentialState {
    refresh_token: String,
    access_token: Option<String>,
    expires_at: Option<Instant>,
}

impl CredentialState {
    fn valid_token(&self) -> Option<&str> {
        match (&self.access_token, self.expires_at) {
            (Some(token), Some(expires_at))
                if Instant::now() + TOKEN_EXPIRY_BUFFER < expires_at =>
            {
                Some(token.as_str())
            }
            _ => None,
        }
    }
}

/// Keeps one Teamleader access token fresh for any number of concurrent callers
#[derive(Debug)]
pub struct TokenManager {
    client_id: String,
    client_secret: String,
    token_url: String,
    http_client: Client,
    state: RwLock<CredentialState>,
    refresh_gate: Mutex<()>,
}

impl TokenManager {
    /// Create a token manager with no cached access token
    pub fn new(client_id: String, client_secret: String, refresh_token: String) -> Self {
        Self {
            client_id,
            client_secret,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            http_client: Client::new(),
            state: RwLock::new(CredentialState {
                refresh_token,
                access_token: None,
                expires_at: None,
            }),
            refresh_gate: Mutex::new(()),
        }
    }

    /// Use a different token endpoint (sandbox or test server)
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Seed the cache with an access token obtained elsewhere
    pub fn with_access_token(mut self, access_token: impl Into<String>, expires_at: Instant) -> Self {
        let state = self.state.get_mut();
        state.access_token = Some(access_token.into());
        state.expires_at = Some(expires_at);
        self
    }

    /// Share an existing HTTP client (connection pool) with the manager
    pub fn with_http_client(mut self, http_client: Client) -> Self {
        self.http_client = http_client;
        self
    }

    /// Token endpoint used for refreshes
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Get a valid access token, refreshing if necessary.
    ///
    /// Refreshes are single-flight: callers that find the token stale while
    /// another refresh is running wait for it and reuse its result.
    pub async fn get_access_token(&self) -> Result<String, AuthError> {
        if let Some(token) = self.cached_token().await {
            tracing::debug!("Using cached access token");
            return Ok(token);
        }

        let _guard = self.refresh_gate.lock().await;

        // Another caller may have refreshed while we waited for the gate
        if let Some(token) = self.cached_token().await {
            tracing::debug!("Access token refreshed by a concurrent caller");
            return Ok(token);
        }

        self.refresh().await
    }

    /// Current refresh token; differs from the initial one after a rotation
    pub async fn get_refresh_token(&self) -> String {
        self.state.read().await.refresh_token.clone()
    }

    async fn cached_token(&self) -> Option<String> {
        let state = self.state.read().await;
        state.valid_token().map(str::to_string)
    }

    /// Exchange the current refresh token for a new access token.
    /// Must be called with `refresh_gate` held.
    async fn refresh(&self) -> Result<String, AuthError> {
        tracing::info!("Refreshing Teamleader access token");

        let refresh_token = self.get_refresh_token().await;
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::RefreshRejected {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        let token_response: TokenResponse = response.json().await.map_err(|e| {
            AuthError::ParseError(format!("Failed to parse token response: {}", e))
        })?;

        let expires_at = Instant::now() + Duration::from_secs(token_response.expires_in);
        let rotated = token_response.refresh_token.is_some();

        {
            let mut state = self.state.write().await;
            state.access_token = Some(token_response.access_token.clone());
            state.expires_at = Some(expires_at);
            if let Some(refresh_token) = token_response.refresh_token {
                state.refresh_token = refresh_token;
            }
        }

        tracing::info!(
            rotated,
            "Access token refreshed, expires in {} seconds",
            token_response.expires_in
        );

        Ok(token_response.access_token)
    }
}
