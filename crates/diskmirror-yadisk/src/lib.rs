//! diskmirror Yadisk - Yandex Disk REST API adapter
//!
//! Provides:
//! - An async HTTP client for the `/v1/disk/resources` endpoints
//! - [`IRemoteStore`](diskmirror_core::ports::IRemoteStore) on top of it
//!
//! ## Modules
//!
//! - [`client`] - Authenticated HTTP client and API error decoding
//! - [`store`] - The remote store adapter used by the sync engine

pub mod client;
pub mod store;

use diskmirror_core::ports::StoreError;
use thiserror::Error;

/// Errors that can occur when communicating with the Yandex Disk API
#[derive(Debug, Error)]
pub enum YadiskError {
    /// The OAuth token is missing, invalid or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The API answered with an unexpected status
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message reported by the API, or the status text
        message: String,
    },

    /// The request failed before a response was received
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// No token was configured
    #[error("No OAuth token configured")]
    MissingToken,
}

impl From<YadiskError> for StoreError {
    fn from(err: YadiskError) -> Self {
        match err {
            YadiskError::Unauthorized(message) => StoreError::Rejected {
                status: 401,
                message,
            },
            YadiskError::Api { status, message } => StoreError::Rejected { status, message },
            YadiskError::Http(e) if e.is_timeout() => StoreError::Timeout(e.to_string()),
            YadiskError::Http(e) if e.is_decode() => StoreError::InvalidResponse(e.to_string()),
            YadiskError::Http(e) => StoreError::Network(e.to_string()),
            YadiskError::InvalidResponse(message) => StoreError::InvalidResponse(message),
            YadiskError::MissingToken => StoreError::Rejected {
                status: 401,
                message: "No OAuth token configured".to_string(),
            },
        }
    }
}
