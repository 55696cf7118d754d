//! Domain newtypes
//!
//! Thin wrappers that validate their contents on construction, so the rest
//! of the crate can rely on the invariants without re-checking them.

use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

/// Prefix the storage API puts in front of absolute paths.
const DISK_SCHEME_PREFIX: &str = "disk:";

// ============================================================================
// CycleId
// ============================================================================

/// Identifier of a single reconciliation cycle
///
/// Attached to every log line emitted while the cycle runs so that the
/// per-file outcomes of one pass can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CycleId(Uuid);

impl CycleId {
    /// Create a new random CycleId
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CycleId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for CycleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CycleId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| DomainError::InvalidId(e.to_string()))
    }
}

// ============================================================================
// RemotePath
// ============================================================================

/// A path inside the remote store (always starts with `/`)
///
/// Represents folder and file locations such as `/Backup/report.pdf`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemotePath(String);

impl RemotePath {
    /// Create a new RemotePath
    ///
    /// # Errors
    /// Returns error if path doesn't start with `/`, contains empty
    /// segments, or tries to traverse upwards.
    pub fn new(path: String) -> Result<Self, DomainError> {
        if !path.starts_with('/') {
            return Err(DomainError::InvalidRemotePath(format!(
                "Remote path must start with '/': {path}"
            )));
        }

        if path.len() > 1 && path.contains("//") {
            return Err(DomainError::InvalidRemotePath(format!(
                "Remote path contains invalid double slashes: {path}"
            )));
        }

        if path.split('/').any(|segment| segment == "..") {
            return Err(DomainError::InvalidRemotePath(format!(
                "Remote path contains invalid traversal: {path}"
            )));
        }

        Ok(Self(path))
    }

    /// Builds a RemotePath from user-supplied folder notation
    ///
    /// Accepts `Backup`, `/Backup`, `/Backup/` and `disk:/Backup`, all of
    /// which name the same folder.
    ///
    /// # Errors
    /// Returns error if the normalized form is not a valid RemotePath.
    pub fn normalize(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        let without_scheme = trimmed
            .strip_prefix(DISK_SCHEME_PREFIX)
            .unwrap_or(trimmed);
        let without_trailing = without_scheme.trim_end_matches('/');

        if without_trailing.is_empty() {
            return Ok(Self::root());
        }

        if without_trailing.starts_with('/') {
            Self::new(without_trailing.to_string())
        } else {
            Self::new(format!("/{without_trailing}"))
        }
    }

    /// Create the root path "/"
    #[must_use]
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this is the root path
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Join a file name onto this folder path
    ///
    /// # Errors
    /// Returns error if `name` is not a valid flat file name.
    pub fn join(&self, name: &str) -> Result<Self, DomainError> {
        validate_file_name(name)?;

        let new_path = if self.is_root() {
            format!("/{name}")
        } else {
            format!("{}/{name}", self.0)
        };

        Self::new(new_path)
    }

    /// Get the last path component
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }

        self.0.rsplit('/').next()
    }
}

impl Display for RemotePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RemotePath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for RemotePath {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RemotePath> for String {
    fn from(path: RemotePath) -> Self {
        path.0
    }
}

// ============================================================================
// File name validation
// ============================================================================

/// Checks that `name` is usable as an entry of a single flat folder
///
/// # Errors
/// Returns [`DomainError::InvalidFileName`] for empty names, `.`/`..`,
/// and names containing `/`. Backslashes are ordinary characters on both
/// the local filesystem and the remote store.
pub fn validate_file_name(name: &str) -> Result<(), DomainError> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(DomainError::InvalidFileName(name.to_string()));
    }

    if name.contains('/') {
        return Err(DomainError::InvalidFileName(name.to_string()));
    }

    Ok(())
}
