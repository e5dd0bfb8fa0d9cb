//! REST client for the Security Cloud Control API
//!
//! Wraps a reqwest client with:
//! - bearer token authentication
//! - JSON request and response bodies
//! - status classification into [`ApiError`]
//! - exponential backoff for transient failures on idempotent (GET) requests
//!
//! A client is bound to one base URL and one API token. Workflows that act on
//! an MSP-managed tenant derive a second client with [`ApiClient::with_token`]
//! instead of mutating shared state.

use reqwest::{Client, ClientBuilder, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::retry::{with_exponential_backoff, RetryConfig};

const USER_AGENT: &str = concat!("scc-toolkit/", env!("CARGO_PKG_VERSION"));

/// Failure of a single API call
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{method} {url} failed with status {status}: {body}")]
    Status {
        method: Method,
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("{method} {url} could not be sent")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("could not decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Whether repeating the identical request may succeed
    ///
    /// 429 and 5xx responses are transient, as are timeouts and connection
    /// failures. Other client errors and decode failures are not.
    pub fn is_retriable(&self) -> bool {
        match self {
            ApiError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            ApiError::Transport { source, .. } => source.is_timeout() || source.is_connect(),
            ApiError::Decode { .. } => false,
        }
    }

    /// HTTP status of the failed call, if the server answered
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Authenticated client for one API base URL
///
/// # Examples
///
/// ```
/// use scc_toolkit::http::ApiClient;
/// use std::time::Duration;
///
/// # fn example() -> anyhow::Result<()> {
/// let client = ApiClient::new(
///     "https://us.manage.security.cisco.com/api/rest",
///     "my-token",
///     Duration::from_secs(30),
/// )?;
/// let tenant_client = client.with_token("tenant-token");
/// assert_eq!(client.base_url(), tenant_client.base_url());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_token: String,
    retry_config: RetryConfig,
}

impl ApiClient {
    /// Creates a client for `base_url` authenticated with `api_token`
    ///
    /// The base URL may include a path prefix (`.../api/rest`); request paths
    /// are appended to it verbatim.
    pub fn new(base_url: &str, api_token: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {e}"))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
            retry_config: RetryConfig::default(),
        })
    }

    /// Sets a custom retry configuration for idempotent requests
    pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Returns a client for the same API authenticated with another token
    ///
    /// The underlying connection pool is shared.
    pub fn with_token(&self, api_token: &str) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            api_token: api_token.to_string(),
            retry_config: self.retry_config.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    /// Sends a GET request and decodes the JSON response
    ///
    /// Transient failures are retried per the client's [`RetryConfig`].
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let body = with_exponential_backoff(
            || self.send(Method::GET, path, query, Option::<&()>::None),
            |err: &ApiError| {
                let retriable = err.is_retriable();
                if retriable {
                    warn!("Transient API failure, will retry: {}", err);
                }
                retriable
            },
            &self.retry_config,
        )
        .await?;

        self.decode(path, &body)
    }

    /// Sends a POST request with a JSON body and decodes the JSON response
    ///
    /// POSTs create server-side work and are never retried.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let text = self.send(Method::POST, path, &[], Some(body)).await?;
        self.decode(path, &text)
    }

    /// Sends a POST request without a body and decodes the JSON response
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let text = self.send(Method::POST, path, &[], Option::<&()>::None).await?;
        self.decode(path, &text)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<String, ApiError> {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .bearer_auth(&self.api_token)
            .header(reqwest::header::ACCEPT, "application/json");

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|source| ApiError::Transport {
            method: method.clone(),
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| ApiError::Transport {
            method: method.clone(),
            url: url.clone(),
            source,
        })?;

        if !status.is_success() {
            return Err(ApiError::Status {
                method,
                url,
                status,
                body: text,
            });
        }

        Ok(text)
    }

    fn decode<T: DeserializeOwned>(&self, path: &str, body: &str) -> Result<T, ApiError> {
        // Some endpoints answer 204 or an empty 200
        let body = if body.trim().is_empty() { "null" } else { body };
        serde_json::from_str(body).map_err(|source| ApiError::Decode {
            url: self.url(path),
            source,
        })
    }
}
