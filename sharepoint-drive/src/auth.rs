//! Access tokens for Graph requests.
//!
//! Token acquisition (client credentials, refresh) happens outside this tool;
//! the CLI receives a ready bearer token through `GRAPH_ACCESS_TOKEN`, for
//! example from `az account get-access-token --resource https://graph.microsoft.com`.

use async_trait::async_trait;
use sharepoint_drive_core::error::RemoteError;

use crate::load_config::ACCESS_TOKEN_VAR;

/// Supplies the bearer token attached to every Graph request.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, RemoteError>;
}

/// A fixed token handed in from configuration.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String, RemoteError> {
        if self.token.trim().is_empty() {
            return Err(RemoteError::Auth("access token is empty".into()));
        }
        Ok(self.token.clone())
    }
}

/// Reads the token from an environment variable on every request.
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    /// Provider for `GRAPH_ACCESS_TOKEN`.
    pub fn graph() -> Self {
        Self::new(ACCESS_TOKEN_VAR)
    }
}

#[async_trait]
impl AccessTokenProvider for EnvTokenProvider {
    async fn access_token(&self) -> Result<String, RemoteError> {
        match std::env::var(&self.var) {
            Ok(token) if !token.trim().is_empty() => Ok(token),
            Ok(_) => Err(RemoteError::Auth(format!("{} is empty", self.var))),
            Err(e) => Err(RemoteError::Auth(format!("{} not set: {e}", self.var))),
        }
    }
}
