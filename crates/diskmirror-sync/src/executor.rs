//! Action executor
//!
//! Runs a [`Plan`] against an [`IRemoteStore`], one action at a time, and
//! records an [`Outcome`] for each. Execution is best-effort: a failed
//! action is logged and reported, and the remaining actions still run.
//! Nothing is retried within a cycle; the next cycle re-plans from fresh
//! snapshots and picks up whatever is still out of sync.

use std::{path::PathBuf, sync::Arc};

use diskmirror_core::{
    domain::{Action, ActionKind, Outcome, Plan, RemotePath},
    ports::{IRemoteStore, StoreError},
};
use tracing::{debug, info, warn};

// ============================================================================
// ExecutionReport
// ============================================================================

/// Per-action results of executing one plan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    records: Vec<(Action, Outcome)>,
}

impl ExecutionReport {
    /// All `(action, outcome)` records in execution order
    #[must_use]
    pub fn records(&self) -> &[(Action, Outcome)] {
        &self.records
    }

    /// Number of executed actions
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no action was executed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of successful actions of the given kind
    #[must_use]
    pub fn succeeded(&self, kind: ActionKind) -> usize {
        self.records
            .iter()
            .filter(|(action, outcome)| action.kind() == kind && outcome.is_success())
            .count()
    }

    /// Number of failed actions of any kind
    #[must_use]
    pub fn failed(&self) -> usize {
        self.records
            .iter()
            .filter(|(_, outcome)| !outcome.is_success())
            .count()
    }

    /// The failed actions with their reasons
    pub fn failures(&self) -> impl Iterator<Item = (&Action, &str)> {
        self.records
            .iter()
            .filter_map(|(action, outcome)| outcome.failure_reason().map(|r| (action, r)))
    }

    /// Outcome recorded for the action targeting `name`, if any
    #[must_use]
    pub fn outcome_for(&self, name: &str) -> Option<&Outcome> {
        self.records
            .iter()
            .find(|(action, _)| action.name() == name)
            .map(|(_, outcome)| outcome)
    }

    fn push(&mut self, action: Action, outcome: Outcome) {
        self.records.push((action, outcome));
    }
}

// ============================================================================
// ActionExecutor
// ============================================================================

/// Executes reconciliation actions against the remote store
///
/// The local root and remote folder are given explicitly; actions carry
/// only file names and are resolved against them.
pub struct ActionExecutor {
    store: Arc<dyn IRemoteStore>,
    local_root: PathBuf,
    remote_folder: RemotePath,
}

impl ActionExecutor {
    /// Creates a new executor
    ///
    /// # Arguments
    /// * `store` - Remote store the actions are applied to
    /// * `local_root` - Local folder holding the file contents
    /// * `remote_folder` - Remote folder that mirrors `local_root`
    pub fn new(store: Arc<dyn IRemoteStore>, local_root: PathBuf, remote_folder: RemotePath) -> Self {
        Self {
            store,
            local_root,
            remote_folder,
        }
    }

    /// Executes every action of `plan` in order
    ///
    /// Never fails as a whole: each action's error becomes an
    /// [`Outcome::Failure`] in the returned report.
    pub async fn execute(&self, plan: &Plan) -> ExecutionReport {
        let mut report = ExecutionReport::default();

        for action in plan {
            let outcome = match self.execute_action(action).await {
                Ok(()) => {
                    info!(action = %action.kind(), file = action.name(), "Action succeeded");
                    Outcome::Success
                }
                Err(err) => {
                    warn!(
                        action = %action.kind(),
                        file = action.name(),
                        status = err.status(),
                        reason = %err.reason(),
                        "Action failed"
                    );
                    Outcome::Failure(err.reason())
                }
            };
            report.push(action.clone(), outcome);
        }

        report
    }

    #[tracing::instrument(skip(self, action), fields(action = %action.kind(), file = action.name()))]
    async fn execute_action(&self, action: &Action) -> Result<(), StoreError> {
        let remote_path = self
            .remote_folder
            .join(action.name())
            .map_err(|e| StoreError::InvalidPath(e.to_string()))?;

        match action {
            // Overwrite reuses the overwrite-enabled upload path; only the
            // log tag differs.
            Action::Upload(name) | Action::Overwrite(name) => {
                self.upload(name, &remote_path).await
            }
            Action::Delete(_) => self.store.delete(&remote_path).await,
        }
    }

    async fn upload(&self, name: &str, remote_path: &RemotePath) -> Result<(), StoreError> {
        let target = self.store.request_upload_target(remote_path, true).await?;
        debug!(href = %target.href, method = %target.method, "Upload target issued");

        let local_path = self.local_root.join(name);
        let data = tokio::fs::read(&local_path)
            .await
            .map_err(|e| StoreError::LocalRead(format!("{}: {e}", local_path.display())))?;
        debug!(bytes = data.len(), "Read local file");

        self.store.transfer(&target, data).await
    }
}
