//! Sync loop - the long-running state machine driving the engine
//!
//! ```text
//! Initializing ──→ FirstSync ──→ SteadyState ──→ Stopped
//!      │                          ↑        │
//!      │ fatal                    └─ sleep ┘
//!      └──────────────────────────────────────→ Stopped
//! ```
//!
//! - **Initializing**: the local folder must exist and the remote folder is
//!   created if missing. Failure here is fatal and ends the loop.
//! - **FirstSync**: one cycle runs right away.
//! - **SteadyState**: sleep for the interval, run a cycle, repeat.
//!
//! A failed cycle is logged and the loop carries on. The inter-cycle sleep
//! is the only point where cancellation is observed, so a running cycle
//! always completes before the loop stops.
//!
//! The current [`LoopState`] is published on a `watch` channel for anyone
//! interested (the daemon logs transitions, tests wait on them).

use std::time::Duration;

use diskmirror_core::{config::Config, ports::FolderStatus};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{engine::SyncEngine, SyncError};

// ============================================================================
// LoopState
// ============================================================================

/// Lifecycle state of a [`SyncLoop`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Checking the local folder and preparing the remote folder
    Initializing,
    /// Running the first cycle, right after startup
    FirstSync,
    /// Cycling on the configured interval
    SteadyState,
    /// Terminal: the loop has stopped
    Stopped,
}

impl LoopState {
    /// Lowercase label used in logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LoopState::Initializing => "initializing",
            LoopState::FirstSync => "first_sync",
            LoopState::SteadyState => "steady_state",
            LoopState::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for LoopState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SyncLoop
// ============================================================================

/// Periodically runs [`SyncEngine`] cycles until cancelled
pub struct SyncLoop {
    engine: SyncEngine,
    interval: Duration,
    state_tx: watch::Sender<LoopState>,
}

impl SyncLoop {
    /// Creates a new loop around `engine`, sleeping `interval` between cycles
    pub fn new(engine: SyncEngine, interval: Duration) -> Self {
        let (state_tx, _) = watch::channel(LoopState::Initializing);
        Self {
            engine,
            interval,
            state_tx,
        }
    }

    /// Creates a loop from the application configuration
    ///
    /// # Errors
    /// Returns [`SyncError::Domain`] if `remote.folder` is not a valid path.
    pub fn from_config(
        store: std::sync::Arc<dyn diskmirror_core::ports::IRemoteStore>,
        config: &Config,
    ) -> Result<Self, SyncError> {
        let engine = SyncEngine::from_config(store, config)?;
        Ok(Self::new(
            engine,
            Duration::from_secs(config.sync.interval_secs),
        ))
    }

    /// The engine driven by this loop
    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    /// Subscribes to state transitions
    pub fn subscribe(&self) -> watch::Receiver<LoopState> {
        self.state_tx.subscribe()
    }

    /// The current state
    pub fn state(&self) -> LoopState {
        *self.state_tx.borrow()
    }

    fn set_state(&self, state: LoopState) {
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            info!(from = %previous, to = %state, "Sync loop state changed");
        }
    }

    /// Prepares both sides for syncing
    ///
    /// Verifies that the local folder exists and makes sure the remote
    /// folder exists, creating it when absent.
    ///
    /// # Errors
    /// - [`SyncError::LocalRootMissing`] if the local folder is not a directory
    /// - [`SyncError::RemoteFolder`] if the remote folder cannot be created
    pub async fn initialize(&self) -> Result<FolderStatus, SyncError> {
        self.set_state(LoopState::Initializing);

        let local_root = self.engine.local_root();
        match tokio::fs::metadata(local_root).await {
            Ok(meta) if meta.is_dir() => {}
            _ => {
                error!(local = %local_root.display(), "Local folder does not exist");
                return Err(SyncError::LocalRootMissing(local_root.to_path_buf()));
            }
        }

        let remote_folder = self.engine.remote_folder();
        let status = self
            .engine
            .store()
            .ensure_folder(remote_folder)
            .await
            .map_err(|err| {
                error!(remote = %remote_folder, error = %err, "Cannot prepare remote folder");
                SyncError::RemoteFolder(err)
            })?;

        match status {
            FolderStatus::Created => info!(remote = %remote_folder, "Remote folder created"),
            FolderStatus::Existed => info!(remote = %remote_folder, "Remote folder found"),
        }

        Ok(status)
    }

    /// Runs the loop until `shutdown` is cancelled
    ///
    /// # Errors
    /// Only initialization failures are returned. Once the loop is cycling,
    /// cycle errors are logged and never end it.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<(), SyncError> {
        if let Err(err) = self.initialize().await {
            self.set_state(LoopState::Stopped);
            return Err(err);
        }

        if shutdown.is_cancelled() {
            info!("Shutdown requested before first sync");
            self.set_state(LoopState::Stopped);
            return Ok(());
        }

        self.set_state(LoopState::FirstSync);
        self.run_cycle_logged().await;

        self.set_state(LoopState::SteadyState);
        info!(interval_secs = self.interval.as_secs(), "Entering steady state");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.cancelled() => {
                    info!("Shutdown signal received");
                    break;
                }
            }

            self.run_cycle_logged().await;
        }

        self.set_state(LoopState::Stopped);
        info!("Sync loop stopped");
        Ok(())
    }

    async fn run_cycle_logged(&self) {
        match self.engine.run_cycle().await {
            Ok(report) if report.is_clean() => {}
            Ok(report) => {
                warn!(
                    cycle_id = %report.cycle_id,
                    failed = report.failures.len(),
                    "Sync cycle finished with failures"
                );
            }
            Err(err) => {
                error!(error = %err, "Sync cycle failed; retrying next interval");
            }
        }
    }
}
