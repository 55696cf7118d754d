//! Remote store port (driven/secondary port)
//!
//! This module defines the interface for the remote backing service that
//! holds the mirrored folder. The primary implementation targets the
//! Yandex Disk REST API, but the trait only describes the five
//! operations the reconciliation engine actually needs.
//!
//! ## Design Notes
//!
//! - Operations return [`StoreError`] instead of `anyhow::Error` so the
//!   engine can match on the kind of failure (a rejected request versus a
//!   network problem) without string inspection.
//! - Request timeouts are the adapter's business; they surface here as
//!   [`StoreError::Timeout`] and are treated like any other failure.
//! - Uses `#[async_trait]` for async trait methods.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::newtypes::RemotePath;

// ============================================================================
// StoreError
// ============================================================================

/// Failure kinds reported by an [`IRemoteStore`] implementation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store answered, but not with the status the operation requires
    #[error("Rejected by store (HTTP {status}): {message}")]
    Rejected {
        /// HTTP status code returned by the store
        status: u16,
        /// The store's own explanation, when it gave one
        message: String,
    },

    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// The request exceeded the adapter's timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The store answered with a body that could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The local content for an upload could not be read
    #[error("Local read failed: {0}")]
    LocalRead(String),

    /// The file name cannot be placed inside the remote folder
    #[error("Invalid remote path: {0}")]
    InvalidPath(String),
}

impl StoreError {
    /// The HTTP status attached to a rejection, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The store-reported reason, falling back to the error's display text
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            StoreError::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// Port DTOs
// ============================================================================

/// Result of [`IRemoteStore::ensure_folder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderStatus {
    /// The folder was already there
    Existed,
    /// The folder was missing and has been created
    Created,
}

/// Type of an entry in a remote folder listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    #[serde(alias = "dir")]
    Directory,
}

/// A single entry of a remote folder listing
///
/// This is a port-level DTO; [`FileSnapshot::from_remote_listing`]
/// turns a listing into the domain snapshot.
///
/// [`FileSnapshot::from_remote_listing`]: crate::domain::snapshot::FileSnapshot::from_remote_listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    /// Entry name inside the listed folder
    pub name: String,
    /// Whether the entry is a file or a sub-folder
    pub kind: EntryKind,
    /// Last modification instant reported by the store
    pub modified: DateTime<Utc>,
}

/// Location the store hands out for a single upload
///
/// Valid for one transfer only; the engine requests a fresh one per file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    /// Absolute URL the bytes must be sent to
    pub href: String,
    /// HTTP method the store expects for the transfer (usually `PUT`)
    pub method: String,
}

// ============================================================================
// IRemoteStore trait
// ============================================================================

/// Port trait for the remote folder the local directory is mirrored into
///
/// Implementations must be usable from a single task; the engine never
/// issues concurrent calls, so no internal locking is required.
#[async_trait::async_trait]
pub trait IRemoteStore: Send + Sync {
    /// Makes sure the folder at `path` exists, creating it if absent
    async fn ensure_folder(&self, path: &RemotePath) -> Result<FolderStatus, StoreError>;

    /// Lists every entry (files and sub-folders) directly inside `path`
    async fn list_files(&self, path: &RemotePath) -> Result<Vec<RemoteEntry>, StoreError>;

    /// Asks the store where the content for `path` should be sent
    ///
    /// # Arguments
    /// * `path` - Full remote path of the file
    /// * `overwrite` - Whether an existing file at `path` may be replaced
    async fn request_upload_target(
        &self,
        path: &RemotePath,
        overwrite: bool,
    ) -> Result<UploadTarget, StoreError>;

    /// Sends the file content to a previously issued upload target
    ///
    /// Succeeds only when the store reports the file as created.
    async fn transfer(&self, target: &UploadTarget, data: Vec<u8>) -> Result<(), StoreError>;

    /// Deletes the file at `path`
    ///
    /// Succeeds only when the store reports the file as deleted.
    async fn delete(&self, path: &RemotePath) -> Result<(), StoreError>;
}
