//! Sync engine - one reconciliation cycle
//!
//! A cycle is: scan the local folder, list the remote folder, compute the
//! plan, execute it. Each cycle builds fresh snapshots and a fresh plan;
//! nothing carries over from the previous one.
//!
//! ## Remote listing failures
//!
//! When the remote listing fails, the engine follows the configured
//! [`ListingFailurePolicy`]:
//!
//! - `SkipCycle` (default): the cycle ends with [`SyncError::RemoteListing`]
//!   and nothing is touched.
//! - `TreatAsEmpty`: the remote side is taken to be empty, so every local
//!   file is uploaded again. A store outage can therefore cause a burst
//!   of uploads.

use std::{path::PathBuf, sync::Arc, time::Instant};

use diskmirror_core::{
    config::{Config, ListingFailurePolicy},
    domain::{Action, ActionKind, CycleId, FileSnapshot, Plan, RemotePath},
    ports::IRemoteStore,
};
use tracing::{debug, info, warn, Instrument};

use crate::{
    executor::{ActionExecutor, ExecutionReport},
    filesystem::scan_local_snapshot,
    planner, SyncError,
};

// ============================================================================
// CycleReport
// ============================================================================

/// Summary of one completed sync cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Identifier attached to every log line of the cycle
    pub cycle_id: CycleId,
    /// Number of files uploaded because they were missing remotely
    pub uploaded: usize,
    /// Number of remote files replaced by a newer local copy
    pub overwritten: usize,
    /// Number of remote files removed because they no longer exist locally
    pub deleted: usize,
    /// Actions that failed, with the reason reported for each
    pub failures: Vec<(Action, String)>,
    /// Wall-clock duration of the cycle in milliseconds
    pub duration_ms: u64,
}

impl CycleReport {
    fn from_execution(cycle_id: CycleId, execution: &ExecutionReport, duration_ms: u64) -> Self {
        Self {
            cycle_id,
            uploaded: execution.succeeded(ActionKind::Upload),
            overwritten: execution.succeeded(ActionKind::Overwrite),
            deleted: execution.succeeded(ActionKind::Delete),
            failures: execution
                .failures()
                .map(|(action, reason)| (action.clone(), reason.to_string()))
                .collect(),
            duration_ms,
        }
    }

    /// Returns true if every action of the cycle succeeded
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

// ============================================================================
// SyncEngine
// ============================================================================

/// Runs reconciliation cycles between a local folder and a remote store
pub struct SyncEngine {
    store: Arc<dyn IRemoteStore>,
    local_root: PathBuf,
    remote_folder: RemotePath,
    listing_failure: ListingFailurePolicy,
    executor: ActionExecutor,
}

impl SyncEngine {
    /// Creates a new `SyncEngine`
    ///
    /// # Arguments
    /// * `store` - Remote store adapter
    /// * `local_root` - Local folder whose files are mirrored
    /// * `remote_folder` - Remote folder receiving the mirror
    /// * `listing_failure` - What to do when the remote listing fails
    pub fn new(
        store: Arc<dyn IRemoteStore>,
        local_root: PathBuf,
        remote_folder: RemotePath,
        listing_failure: ListingFailurePolicy,
    ) -> Self {
        let executor = ActionExecutor::new(
            Arc::clone(&store),
            local_root.clone(),
            remote_folder.clone(),
        );
        Self {
            store,
            local_root,
            remote_folder,
            listing_failure,
            executor,
        }
    }

    /// Creates a `SyncEngine` from the application configuration
    ///
    /// # Errors
    /// Returns [`SyncError::Domain`] if `remote.folder` is not a valid path.
    pub fn from_config(store: Arc<dyn IRemoteStore>, config: &Config) -> Result<Self, SyncError> {
        Ok(Self::new(
            store,
            config.local_folder_path(),
            config.remote_folder_path()?,
            config.sync.listing_failure,
        ))
    }

    /// The remote store this engine talks to
    pub fn store(&self) -> &Arc<dyn IRemoteStore> {
        &self.store
    }

    /// Local folder being mirrored
    pub fn local_root(&self) -> &std::path::Path {
        &self.local_root
    }

    /// Remote folder receiving the mirror
    pub fn remote_folder(&self) -> &RemotePath {
        &self.remote_folder
    }

    /// Runs one full cycle: scan → list → plan → execute
    ///
    /// # Errors
    /// Returns an error when the cycle cannot start: the local folder is
    /// unreadable, or the remote listing failed under
    /// [`ListingFailurePolicy::SkipCycle`]. Failures of individual actions
    /// are not errors; they are listed in [`CycleReport::failures`].
    pub async fn run_cycle(&self) -> Result<CycleReport, SyncError> {
        let cycle_id = CycleId::new();
        let span = tracing::info_span!("cycle", cycle_id = %cycle_id);

        async move {
            let start = Instant::now();
            info!(
                local = %self.local_root.display(),
                remote = %self.remote_folder,
                "Starting sync cycle"
            );

            let plan = match self.plan_only().await {
                Ok(plan) => plan,
                Err(err) => {
                    warn!(error = %err, "Sync cycle aborted");
                    return Err(err);
                }
            };

            let execution = self.executor.execute(&plan).await;
            let report = CycleReport::from_execution(
                cycle_id,
                &execution,
                start.elapsed().as_millis() as u64,
            );

            info!(
                uploaded = report.uploaded,
                overwritten = report.overwritten,
                deleted = report.deleted,
                failed = report.failures.len(),
                duration_ms = report.duration_ms,
                "Sync cycle completed"
            );

            Ok(report)
        }
        .instrument(span)
        .await
    }

    /// Computes the plan for the current state without executing it
    ///
    /// # Errors
    /// Same conditions as [`run_cycle`](Self::run_cycle).
    pub async fn plan_only(&self) -> Result<Plan, SyncError> {
        let local = scan_local_snapshot(&self.local_root).await?;
        let remote = self.remote_snapshot().await?;

        let plan = planner::plan(&local, &remote);
        debug!(
            local_files = local.len(),
            remote_files = remote.len(),
            uploads = plan.count_of(ActionKind::Upload),
            deletes = plan.count_of(ActionKind::Delete),
            overwrites = plan.count_of(ActionKind::Overwrite),
            "Plan computed"
        );
        Ok(plan)
    }

    async fn remote_snapshot(&self) -> Result<FileSnapshot, SyncError> {
        match self.store.list_files(&self.remote_folder).await {
            Ok(entries) => Ok(FileSnapshot::from_remote_listing(entries)),
            Err(err) => match self.listing_failure {
                ListingFailurePolicy::SkipCycle => Err(SyncError::RemoteListing(err)),
                ListingFailurePolicy::TreatAsEmpty => {
                    warn!(
                        error = %err,
                        "Remote listing failed; treating remote folder as empty"
                    );
                    Ok(FileSnapshot::new())
                }
            },
        }
    }
}
