//! HTTP transport for the Microsoft Graph API.
//!
//! Wraps `reqwest::Client` with bearer-token injection, refresh-on-401,
//! exponential backoff for transient statuses, response classification and
//! lazy `@odata.nextLink` paging.

use crate::auth::TokenSession;
use crate::config::{GraphConfig, OAuthCredentials};
use crate::error::{GraphError, GraphResult};
use futures::stream::{self, LocalBoxStream, StreamExt};
use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Upper bound for a single backoff sleep.
const MAX_BACKOFF: Duration = Duration::from_secs(120);

/// Lazy, finite sequence of page bodies. Restarting means requesting again.
pub type PageStream<'a> = LocalBoxStream<'a, GraphResult<Value>>;

/// Graph API client holding the OAuth session for the duration of a run.
pub struct GraphClient {
    http: Client,
    config: GraphConfig,
    session: TokenSession,
}

impl GraphClient {
    /// Creates the client and obtains the first access token.
    pub async fn connect(config: GraphConfig, credentials: OAuthCredentials) -> GraphResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let session = TokenSession::new(http.clone(), config.oauth_token_url.clone(), credentials);
        session.refresh().await?;

        Ok(Self {
            http,
            config,
            session,
        })
    }

    /// Returns the transport configuration.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Returns the OAuth session.
    pub fn session(&self) -> &TokenSession {
        &self.session
    }

    /// Full URL for a Graph endpoint path. Absolute URLs (paging links) pass through.
    pub fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("https://") || endpoint.starts_with("http://") {
            endpoint.to_string()
        } else {
            format!(
                "{}/{}",
                self.config.api_base_url.trim_end_matches('/'),
                endpoint.trim_start_matches('/')
            )
        }
    }

    /// Issues one logical request.
    ///
    /// Returns the parsed body for 200/201/202 and `None` for 204. A 401 triggers
    /// a token refresh followed by exactly one more attempt.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(&str, &str)],
        body: Option<&Value>,
    ) -> GraphResult<Option<Value>> {
        let url = self.url(endpoint);
        let mut response = self.send_with_retry(&method, &url, params, body).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            debug!("Access token rejected for {} {}, refreshing", method, endpoint);
            self.session.refresh().await?;
            response = self.send_with_retry(&method, &url, params, body).await?;
        }

        parse_response(response, endpoint).await
    }

    pub async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> GraphResult<Option<Value>> {
        self.request(Method::GET, endpoint, params, None).await
    }

    pub async fn post(&self, endpoint: &str, body: &Value) -> GraphResult<Option<Value>> {
        self.request(Method::POST, endpoint, &[], Some(body)).await
    }

    pub async fn delete(&self, endpoint: &str) -> GraphResult<()> {
        self.request(Method::DELETE, endpoint, &[], None).await?;
        Ok(())
    }

    /// Follows `@odata.nextLink` lazily, yielding one page body per item.
    ///
    /// Query parameters apply to the first request only; next links already carry them.
    pub fn pages(&self, endpoint: &str, params: &[(&str, &str)]) -> PageStream<'_> {
        let params: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let first = Some((endpoint.to_string(), params));

        stream::try_unfold(first, move |next| async move {
            let Some((endpoint, params)) = next else {
                return Ok::<_, GraphError>(None);
            };
            let query: Vec<(&str, &str)> = params
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();

            let page = self.get(&endpoint, &query).await?.unwrap_or(Value::Null);
            let next = page
                .get("@odata.nextLink")
                .and_then(Value::as_str)
                .map(|link| (link.to_string(), Vec::new()));

            Ok::<_, GraphError>(Some((page, next)))
        })
        .boxed_local()
    }

    // ── Internal ────────────────────────────────────────────────

    async fn send_with_retry(
        &self,
        method: &Method,
        url: &str,
        params: &[(&str, &str)],
        body: Option<&Value>,
    ) -> GraphResult<Response> {
        let mut attempt: u32 = 0;
        loop {
            let token = self.session.access_token().await.unwrap_or_default();
            let mut request = self
                .http
                .request(method.clone(), url)
                .bearer_auth(token)
                .query(params);
            if let Some(body) = body {
                request = request.json(body);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if !self.config.retry_statuses.contains(&status) || attempt >= self.config.max_retries {
                        return Ok(response);
                    }
                    attempt += 1;
                    let delay = self.backoff(attempt).max(retry_after(&response));
                    warn!(
                        "{} {} returned {}, retry {}/{} after {:?}",
                        method, url, status, attempt, self.config.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) if (e.is_connect() || e.is_timeout()) && attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay = self.backoff(attempt);
                    warn!(
                        "{} {} failed: {}, retry {}/{} after {:?}",
                        method, url, e, attempt, self.config.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Delay before retry number `attempt` (1-based).
    fn backoff(&self, attempt: u32) -> Duration {
        let secs = self.config.backoff_factor * 2f64.powi(attempt.saturating_sub(1) as i32);
        Duration::try_from_secs_f64(secs)
            .unwrap_or(MAX_BACKOFF)
            .min(MAX_BACKOFF)
    }
}

fn retry_after(response: &Response) -> Duration {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::ZERO)
        .min(MAX_BACKOFF)
}

/// Classifies a response: 200/201/202 carry a body, 204 carries none,
/// everything else becomes a [`GraphError::Api`].
pub(crate) async fn parse_response(response: Response, endpoint: &str) -> GraphResult<Option<Value>> {
    let status = response.status().as_u16();
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    let text = response.text().await?;

    match status {
        200 | 201 | 202 => {
            if is_json && !text.is_empty() {
                Ok(Some(serde_json::from_str(&text)?))
            } else {
                Ok(Some(Value::String(text)))
            }
        }
        204 => Ok(None),
        _ => Err(GraphError::api(status, endpoint, text)),
    }
}
