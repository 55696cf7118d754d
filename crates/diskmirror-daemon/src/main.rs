//! diskmirror Daemon - Background mirroring service
//!
//! Runs as a long-lived user service and handles:
//! - Mirroring the local folder into the remote folder on a fixed interval
//! - Logging to stderr and a log file rotated by size while running
//! - Graceful shutdown on SIGTERM/SIGINT
//!
//! # Architecture
//!
//! The daemon loads and validates the configuration, builds the Yandex Disk
//! store and hands it to a [`SyncLoop`]. The loop is controlled by a
//! `CancellationToken` that is triggered on receipt of SIGTERM or SIGINT;
//! a cycle that is already running is allowed to finish.

mod logging;

use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::Parser;
use diskmirror_core::config::Config;
use diskmirror_sync::scheduler::SyncLoop;
use diskmirror_yadisk::store::YadiskRemoteStore;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Command-line arguments of the daemon
#[derive(Debug, Parser)]
#[command(name = "diskmirrord", version, about = "Mirror a local folder to Yandex Disk")]
struct Args {
    /// Configuration file (defaults to ~/.config/diskmirror/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

// ============================================================================
// DaemonService
// ============================================================================

/// Main daemon service that owns the configuration and the shutdown token
struct DaemonService {
    /// Validated application configuration
    config: Config,
    /// Token for signalling graceful shutdown to the sync loop
    shutdown: CancellationToken,
}

impl DaemonService {
    fn new(config: Config, shutdown: CancellationToken) -> Self {
        Self { config, shutdown }
    }

    /// Runs the sync loop until shutdown
    ///
    /// 1. Builds the Yandex Disk store from the configuration
    /// 2. Builds the sync loop (engine, executor, planner)
    /// 3. Runs it until the shutdown token is cancelled
    async fn run(&self) -> Result<()> {
        let store = YadiskRemoteStore::from_config(&self.config)
            .context("Failed to create Yandex Disk store")?;

        let sync_loop = SyncLoop::from_config(Arc::new(store), &self.config)
            .context("Failed to create sync loop")?;

        info!(
            local = %self.config.local_folder_path().display(),
            remote = %self.config.remote.folder,
            interval_secs = self.config.sync.interval_secs,
            "Mirroring configured"
        );

        sync_loop
            .run(self.shutdown.clone())
            .await
            .context("Sync loop could not start")?;

        if self.shutdown.is_cancelled() {
            info!("Interrupted by user");
        }
        Ok(())
    }
}

// ============================================================================
// Signal handling
// ============================================================================

/// Waits for SIGTERM or SIGINT and cancels the token
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}

// ============================================================================
// Main entry point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (config, config_path) = Config::load_from(args.config.as_deref())?;

    let log_file = logging::init(&config.logging, config.log_file_path());

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config_path = %config_path.display(),
        "diskmirror daemon starting"
    );

    let errors = config.validate();
    if !errors.is_empty() {
        for err in &errors {
            error!(field = %err.field, "{}", err.message);
        }
        bail!("Invalid configuration ({} errors)", errors.len());
    }

    let shutdown_token = CancellationToken::new();
    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        shutdown_signal(signal_token).await;
    });

    if let Some(log_file) = log_file {
        tokio::spawn(logging::rotation_task(
            log_file,
            shutdown_token.clone(),
            logging::ROTATION_CHECK_INTERVAL,
        ));
    }

    let service = DaemonService::new(config, shutdown_token);
    let result = service.run().await;

    match &result {
        Ok(()) => info!("diskmirror daemon shut down gracefully"),
        Err(e) => error!(error = %format!("{e:#}"), "diskmirror daemon exiting with error"),
    }

    result
}

// ============================================================================
// Tests
// ============================================================================
