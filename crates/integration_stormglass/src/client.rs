//! Stormglass point-forecast client
//!
//! HTTP client for `GET /v2/weather/point`.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Stormglass client errors
#[derive(Debug, Error)]
pub enum StormglassError {
    /// Connection to the API could not be established
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Request to the API failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The API rejected the credential
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Service is temporarily unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Daily request quota exhausted
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// No API key configured
    #[error("No API key configured")]
    MissingApiKey,
}

impl From<reqwest::Error> for StormglassError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}

/// Stormglass client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StormglassConfig {
    /// Point endpoint URL (default: <https://api.stormglass.io/v2/weather/point>)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key sent in the `Authorization` header
    #[serde(default)]
    pub api_key: Option<String>,

    /// Connection timeout in seconds (default: 3)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Total request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.stormglass.io/v2/weather/point".to_string()
}

const fn default_connect_timeout() -> u64 {
    3
}

const fn default_timeout() -> u64 {
    30
}

impl Default for StormglassConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            connect_timeout_secs: default_connect_timeout(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Point forecast client
#[async_trait]
pub trait PointForecastClient: Send + Sync {
    /// Fetch the raw response body for a point query
    ///
    /// Error responses that carry a JSON body are returned as `Ok` so the
    /// caller can read the API's per-parameter error map.
    async fn point_request(&self, query: &[(String, String)]) -> Result<Bytes, StormglassError>;
}

/// Stormglass HTTP client implementation
#[derive(Debug)]
pub struct StormglassClient {
    client: Client,
    config: StormglassConfig,
}

impl StormglassClient {
    /// Create a new Stormglass client with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: StormglassConfig) -> Result<Self, StormglassError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StormglassError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// The active configuration
    #[must_use]
    pub const fn config(&self) -> &StormglassConfig {
        &self.config
    }

    fn api_key(&self) -> Result<&str, StormglassError> {
        self.config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(StormglassError::MissingApiKey)
    }

    /// Classify a non-success status without a JSON body
    fn status_error(status: StatusCode) -> StormglassError {
        match status {
            StatusCode::TOO_MANY_REQUESTS | StatusCode::PAYMENT_REQUIRED => {
                StormglassError::RateLimitExceeded
            },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                StormglassError::Unauthorized(format!("HTTP {status}"))
            },
            s if s.is_server_error() => StormglassError::ServiceUnavailable(format!("HTTP {s}")),
            s => StormglassError::RequestFailed(format!("HTTP {s}")),
        }
    }
}

/// Whether a body looks like a JSON object the caller can interpret
fn is_json_object(body: &[u8]) -> bool {
    serde_json::from_slice::<serde_json::Value>(body).is_ok_and(|v| v.is_object())
}

#[async_trait]
impl PointForecastClient for StormglassClient {
    #[instrument(skip(self, query), fields(params = query.len()))]
    async fn point_request(&self, query: &[(String, String)]) -> Result<Bytes, StormglassError> {
        let api_key = self.api_key()?;

        debug!(url = %self.config.base_url, query = ?query, "Requesting point forecast");

        let response = self
            .client
            .get(&self.config.base_url)
            .header(header::AUTHORIZATION, api_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            debug!(bytes = body.len(), "Received point forecast");
            return Ok(body);
        }

        if is_json_object(&body) {
            warn!(status = %status, "Point forecast request returned an error body");
            return Ok(body);
        }

        Err(Self::status_error(status))
    }
}
