//! Transport configuration and OAuth application credentials.

use serde::{Deserialize, Serialize};

/// Scope requested when exchanging the refresh token.
pub const DEFAULT_SCOPE: &str = "offline_access Files.Read Sites.ReadWrite.All";

/// Statuses that are retried with exponential backoff.
pub const DEFAULT_RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Configuration for the Graph client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Base URL for the Graph API (e.g. `https://graph.microsoft.com/v1.0`).
    pub api_base_url: String,
    /// OAuth2 token endpoint used for the refresh-token exchange.
    pub oauth_token_url: String,
    /// Maximum number of retries for transient failures.
    pub max_retries: u32,
    /// Exponential backoff factor in seconds.
    pub backoff_factor: f64,
    /// HTTP statuses treated as transient.
    pub retry_statuses: Vec<u16>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://graph.microsoft.com/v1.0".to_string(),
            oauth_token_url: "https://login.microsoftonline.com/common/oauth2/v2.0/token"
                .to_string(),
            max_retries: 9,
            backoff_factor: 0.3,
            retry_statuses: DEFAULT_RETRY_STATUSES.to_vec(),
            timeout_secs: 60,
        }
    }
}

impl GraphConfig {
    /// Also retries `507 Insufficient Storage`.
    pub fn with_insufficient_storage_retry(mut self) -> Self {
        if !self.retry_statuses.contains(&507) {
            self.retry_statuses.push(507);
        }
        self
    }
}

/// OAuth2 application credentials plus the long-lived refresh token.
#[derive(Clone, Serialize, Deserialize)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub scope: String,
}

impl OAuthCredentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
            scope: DEFAULT_SCOPE.to_string(),
        }
    }
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("scope", &self.scope)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_graph_v1() {
        let cfg = GraphConfig::default();
        assert_eq!(cfg.api_base_url, "https://graph.microsoft.com/v1.0");
        assert_eq!(cfg.max_retries, 9);
        assert_eq!(cfg.retry_statuses, vec![429, 500, 502, 503, 504]);
    }

    #[test]
    fn insufficient_storage_retry_is_added_once() {
        let cfg = GraphConfig::default()
            .with_insufficient_storage_retry()
            .with_insufficient_storage_retry();
        assert_eq!(cfg.retry_statuses.iter().filter(|s| **s == 507).count(), 1);
    }

    #[test]
    fn credentials_debug_hides_secrets() {
        let creds = OAuthCredentials::new("app", "s3cret", "rt-value");
        let debug = format!("{creds:?}");
        assert!(debug.contains("app"));
        assert!(!debug.contains("s3cret"));
        assert!(!debug.contains("rt-value"));
    }
}
