//! diskmirror Sync - Reconciliation engine
//!
//! Provides:
//! - Pure reconciliation planning between a local and a remote snapshot
//! - Best-effort execution of a plan against an [`IRemoteStore`]
//! - The periodic sync loop with its startup and shutdown handling
//!
//! ## Modules
//!
//! - [`planner`] - Computes the upload / delete / overwrite plan
//! - [`executor`] - Runs a plan action by action and records outcomes
//! - [`filesystem`] - Builds the local snapshot from a directory
//! - [`engine`] - One full snapshot → plan → execute cycle
//! - [`scheduler`] - The long-running [`SyncLoop`](scheduler::SyncLoop)
//!
//! [`IRemoteStore`]: diskmirror_core::ports::IRemoteStore

pub mod engine;
pub mod executor;
pub mod filesystem;
pub mod planner;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

use std::path::PathBuf;

use diskmirror_core::{domain::errors::DomainError, ports::StoreError};
use thiserror::Error;

/// Errors that can occur during synchronization operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// The local folder to mirror does not exist or is not a directory
    #[error("Local folder not found: {0}")]
    LocalRootMissing(PathBuf),

    /// The local folder exists but could not be enumerated
    #[error("Failed to scan local folder {path}: {source}")]
    LocalScan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The remote folder listing failed and the cycle was skipped
    #[error("Remote listing failed: {0}")]
    RemoteListing(#[source] StoreError),

    /// The remote folder could not be found or created
    #[error("Remote folder unavailable: {0}")]
    RemoteFolder(#[source] StoreError),

    /// A domain-level error propagated from diskmirror-core
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}
