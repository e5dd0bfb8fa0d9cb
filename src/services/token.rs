//! API token validation

use anyhow::Result;
use std::time::Duration;
use tracing::debug;

use crate::http::{ApiClient, ApiError};
use crate::retry::RetryConfig;

pub struct TokenValidationService {
    timeout: Duration,
}

impl TokenValidationService {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Whether `api_token` is accepted by the API at `base_url`
    ///
    /// Client errors (401, 403, ...) mean the token is not valid; anything
    /// else that goes wrong is reported as an error.
    pub async fn validate_token(&self, base_url: &str, api_token: &str) -> Result<bool> {
        let client = ApiClient::new(base_url, api_token, self.timeout)?
            .with_retry_config(RetryConfig::no_retry());

        match client.get_json::<serde_json::Value>("/v1/token", &[]).await {
            Ok(_) => Ok(true),
            Err(ApiError::Status { status, .. }) if status.is_client_error() => {
                debug!("Token rejected with status {}", status);
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }
}
