//! Bearer-token session backed by an OAuth2 refresh token.
//!
//! The session is refreshed once when the client is constructed and again
//! whenever Graph rejects the current token with `401 Unauthorized`.

use crate::config::OAuthCredentials;
use crate::error::{GraphError, GraphResult};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
}

#[derive(Debug)]
struct SessionTokens {
    access_token: Option<String>,
    refresh_token: String,
}

/// Owned OAuth session holding the current bearer token.
pub struct TokenSession {
    http: Client,
    token_url: String,
    credentials: OAuthCredentials,
    tokens: RwLock<SessionTokens>,
}

impl TokenSession {
    /// Creates a session without contacting the token endpoint.
    pub fn new(http: Client, token_url: impl Into<String>, credentials: OAuthCredentials) -> Self {
        let refresh_token = credentials.refresh_token.clone();
        Self {
            http,
            token_url: token_url.into(),
            credentials,
            tokens: RwLock::new(SessionTokens {
                access_token: None,
                refresh_token,
            }),
        }
    }

    /// Returns the current access token, if one has been obtained.
    pub async fn access_token(&self) -> Option<String> {
        self.tokens.read().await.access_token.clone()
    }

    /// Exchanges the refresh token for a new access token.
    ///
    /// A rotated refresh token returned by the endpoint replaces the old one.
    pub async fn refresh(&self) -> GraphResult<String> {
        let refresh_token = self.tokens.read().await.refresh_token.clone();

        debug!("Refreshing Graph access token");

        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
                ("grant_type", "refresh_token"),
                ("scope", self.credentials.scope.as_str()),
            ])
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        if status != 200 {
            return Err(GraphError::api(status, "login", body));
        }

        let token: TokenResponse = serde_json::from_str(&body)?;

        let mut tokens = self.tokens.write().await;
        tokens.access_token = Some(token.access_token.clone());
        if let Some(rotated) = token.refresh_token {
            tokens.refresh_token = rotated;
        }

        Ok(token.access_token)
    }
}
