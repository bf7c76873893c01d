//! Configuration loading
//!
//! Credentials normally come from the MCP host's environment. An optional
//! TOML file can provide the same keys; environment variables win.

use crate::api::DEFAULT_BASE_URL;
use crate::auth::DEFAULT_TOKEN_URL;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_CLIENT_ID: &str = "TEAMLEADER_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "TEAMLEADER_CLIENT_SECRET";
pub const ENV_REFRESH_TOKEN: &str = "TEAMLEADER_REFRESH_TOKEN";
pub const ENV_API_BASE_URL: &str = "TEAMLEADER_API_BASE_URL";
pub const ENV_TOKEN_URL: &str = "TEAMLEADER_TOKEN_URL";
pub const ENV_CONFIG_PATH: &str = "TEAMLEADER_MCP_CONFIG";

/// Config file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "teamleader-mcp.toml";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}. Please set it in your MCP configuration.")]
    MissingCredential(&'static str),

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Raw configuration as read from file and environment
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    pub api_base_url: Option<String>,
    pub token_url: Option<String>,
}

/// Validated configuration used to build the server
#[derive(Clone)]
pub struct RuntimeConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub api_base_url: String,
    pub token_url: String,
}

impl std::fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("token_url", &self.token_url)
            .finish()
    }
}

impl Config {
    /// Load the config file (if any) and overlay the process environment
    pub fn load_default() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os(ENV_CONFIG_PATH) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay values from an environment lookup; unset or empty variables
    /// leave the current value in place
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = read(ENV_CLIENT_ID) {
            self.client_id = Some(v);
        }
        if let Some(v) = read(ENV_CLIENT_SECRET) {
            self.client_secret = Some(v);
        }
        if let Some(v) = read(ENV_REFRESH_TOKEN) {
            self.refresh_token = Some(v);
        }
        if let Some(v) = read(ENV_API_BASE_URL) {
            self.api_base_url = Some(v);
        }
        if let Some(v) = read(ENV_TOKEN_URL) {
            self.token_url = Some(v);
        }
    }

    /// Validate into a runtime config
    pub fn to_runtime(&self) -> Result<RuntimeConfig, ConfigError> {
        fn required(value: &Option<String>, name: &'static str) -> Result<String, ConfigError> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
                .ok_or(ConfigError::MissingCredential(name))
        }

        Ok(RuntimeConfig {
            client_id: required(&self.client_id, ENV_CLIENT_ID)?,
            client_secret: required(&self.client_secret, ENV_CLIENT_SECRET)?,
            refresh_token: required(&self.refresh_token, ENV_REFRESH_TOKEN)?,
            api_base_url: self
                .api_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            token_url: self
                .token_url
                .clone()
                .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
        })
    }
}
