//! Yandex Disk API client
//!
//! Provides a thin HTTP client for the `/v1/disk/resources` API. Handles
//! the `OAuth` authorization header, the per-request timeout, URL
//! construction and decoding of API error bodies.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use diskmirror_yadisk::client::YadiskClient;
//! use reqwest::Method;
//!
//! # async fn example() -> Result<(), diskmirror_yadisk::YadiskError> {
//! let client = YadiskClient::new("oauth-token-here");
//! let response = client
//!     .send(client.request(Method::GET, "").query(&[("path", "/Backup")]))
//!     .await?;
//! println!("status: {}", response.status());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use diskmirror_core::config::{Config, DEFAULT_BASE_URL};
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::YadiskError;

/// Default per-request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// API error body
// ============================================================================

/// Error body returned by the API on non-success statuses
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    /// Human-readable message, e.g. "Resource not found."
    message: Option<String>,
    /// Longer English description
    description: Option<String>,
    /// Machine-readable error code, e.g. `DiskNotFoundError`
    error: Option<String>,
}

impl ApiErrorBody {
    fn reason(self) -> Option<String> {
        self.message
            .or(self.description)
            .or(self.error)
            .filter(|r| !r.trim().is_empty())
    }
}

// ============================================================================
// YadiskClient
// ============================================================================

/// HTTP client for Yandex Disk API calls
///
/// Wraps `reqwest::Client` with the authorization header and base URL of
/// the resources endpoint.
#[derive(Clone)]
pub struct YadiskClient {
    /// The underlying HTTP client
    client: Client,
    /// Resources endpoint, e.g. `https://cloud-api.yandex.net/v1/disk/resources`
    base_url: String,
    /// OAuth token
    token: String,
    /// Timeout applied to every request
    timeout: Duration,
}

impl YadiskClient {
    /// Creates a new client for the public API
    ///
    /// # Arguments
    /// * `token` - A valid OAuth token for Yandex Disk
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (useful for testing)
    ///
    /// # Arguments
    /// * `token` - A valid OAuth token
    /// * `base_url` - Resources endpoint to send requests to
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Creates a client from the application configuration
    ///
    /// # Errors
    /// Returns [`YadiskError::MissingToken`] if neither `remote.token` nor
    /// `DISKMIRROR_TOKEN` provides a token.
    pub fn from_config(config: &Config) -> Result<Self, YadiskError> {
        let token = config.resolved_token().ok_or(YadiskError::MissingToken)?;
        Ok(Self::with_base_url(token, config.remote.base_url.clone())
            .with_timeout(Duration::from_secs(config.remote.request_timeout_secs)))
    }

    /// Sets the timeout applied to every request
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The resources endpoint this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The timeout applied to every request
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates an authenticated request builder for the given method and endpoint
    ///
    /// Prepends the base URL and adds the `Authorization: OAuth` header.
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `endpoint` - Path relative to the resources endpoint (`""` or `"/upload"`)
    pub fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint);
        self.client
            .request(method, &url)
            .header(header::AUTHORIZATION, format!("OAuth {}", self.token))
            .header(header::ACCEPT, "application/json")
            .timeout(self.timeout)
    }

    /// Creates a request to an absolute URL handed out by the API
    ///
    /// No authorization header is attached: upload links are pre-signed.
    pub fn request_absolute(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url).timeout(self.timeout)
    }

    /// Sends a request, returning the response whatever its status
    ///
    /// # Errors
    /// Returns [`YadiskError::Http`] if no response was received.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, YadiskError> {
        let response = request.send().await?;
        debug!(
            url = %response.url(),
            status = response.status().as_u16(),
            "Received response"
        );
        Ok(response)
    }

    /// Turns a non-success response into a [`YadiskError`]
    ///
    /// The API's `message` is used as the reason when the body carries
    /// one; otherwise the status text is.
    pub async fn error_from_response(response: Response) -> YadiskError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(ApiErrorBody::reason)
            .unwrap_or_else(|| status_text(status));

        if status == StatusCode::UNAUTHORIZED {
            YadiskError::Unauthorized(message)
        } else {
            YadiskError::Api {
                status: status.as_u16(),
                message,
            }
        }
    }
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_owned)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
