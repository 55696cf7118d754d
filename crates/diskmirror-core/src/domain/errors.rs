//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! mostly validation failures for names and paths.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid remote path format
    #[error("Invalid remote path: {0}")]
    InvalidRemotePath(String),

    /// A file name that cannot live in a flat folder
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    /// ID parsing error
    #[error("Invalid ID format: {0}")]
    InvalidId(String),
}
