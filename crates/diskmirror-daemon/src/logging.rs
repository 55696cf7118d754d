//! Logging setup for the daemon
//!
//! Human-readable lines go to stderr and, when `logging.file` is set, to
//! the log file as well (without ANSI colors). `RUST_LOG` overrides the
//! configured level.
//!
//! The log file is rotated by size at startup and then periodically by
//! [`rotation_task`] while the daemon runs:
//!   `diskmirror.log → diskmirror.log.1 → … → diskmirror.log.<max_files>`

use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use diskmirror_core::config::LoggingConfig;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{
    fmt::{self, writer::MutexGuardWriter, MakeWriter},
    prelude::*,
    EnvFilter,
};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// How often the running daemon checks the log file size
pub const ROTATION_CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// Installs the global tracing subscriber
///
/// Returns the log file handle when one was opened, so the caller can keep
/// it rotated with [`rotation_task`]. Problems with the log file are not
/// fatal: the daemon keeps logging to stderr and reports the problem once
/// the subscriber is up.
pub fn init(config: &LoggingConfig, log_file: Option<PathBuf>) -> Option<RotatingLogFile> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let mut rotated = false;
    let mut file_error = None;
    let file = log_file.and_then(|path| match RotatingLogFile::open(&path, config) {
        Ok((file, did_rotate)) => {
            rotated = did_rotate;
            Some(file)
        }
        Err(err) => {
            file_error = Some((path, err));
            None
        }
    });

    let stderr_layer = fmt::layer().with_writer(io::stderr).with_target(true);
    let file_layer = file.clone().map(|f| {
        fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(f)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let (true, Some(file)) = (rotated, &file) {
        info!(path = %file.path().display(), "Log file rotated");
    }
    if let Some((path, err)) = file_error {
        warn!(path = %path.display(), error = %err, "Cannot open log file; logging to stderr only");
    }

    file
}

// ============================================================================
// RotatingLogFile
// ============================================================================

/// Append-only log file that can be rotated while the subscriber writes to it
///
/// Clones share the same open file. Every event takes the lock for the
/// duration of one write, and [`RotatingLogFile::rotate`] swaps the handle
/// under the same lock, so no line is split across two files.
#[derive(Clone)]
pub struct RotatingLogFile {
    inner: Arc<LogFileInner>,
}

struct LogFileInner {
    path: PathBuf,
    max_bytes: u64,
    max_files: usize,
    file: Mutex<File>,
}

impl RotatingLogFile {
    /// Prepares the log file: creates its directory, rotates it if oversized,
    /// and opens it for appending
    ///
    /// The flag is `true` when an oversized file was moved aside.
    pub fn open(path: &Path, config: &LoggingConfig) -> io::Result<(Self, bool)> {
        Self::with_limits(
            path,
            config.max_size_mb.saturating_mul(BYTES_PER_MB),
            config.max_files as usize,
        )
    }

    fn with_limits(path: &Path, max_bytes: u64, max_files: usize) -> io::Result<(Self, bool)> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let rotated = rotate_if_needed(path, max_bytes, max_files)?;
        let file = open_append(path)?;

        let log = Self {
            inner: Arc::new(LogFileInner {
                path: path.to_path_buf(),
                max_bytes,
                max_files,
                file: Mutex::new(file),
            }),
        };
        Ok((log, rotated))
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Rotates the file if it reached its size limit and reopens a fresh one
    ///
    /// Must not emit tracing events: the lock held here is the one the file
    /// layer takes to write.
    pub fn rotate(&self) -> io::Result<bool> {
        let inner = &self.inner;
        let mut file = inner.file.lock().unwrap_or_else(PoisonError::into_inner);

        if !rotate_if_needed(&inner.path, inner.max_bytes, inner.max_files)? {
            return Ok(false);
        }
        *file = open_append(&inner.path)?;
        Ok(true)
    }
}

impl<'a> MakeWriter<'a> for RotatingLogFile {
    type Writer = MutexGuardWriter<'a, File>;

    fn make_writer(&'a self) -> Self::Writer {
        self.inner.file.make_writer()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    fs::OpenOptions::new().create(true).append(true).open(path)
}

/// Checks the log file every `period` and rotates it once it is too large
///
/// Runs until `shutdown` is cancelled. Failures are logged and retried on
/// the next tick.
pub async fn rotation_task(log: RotatingLogFile, shutdown: CancellationToken, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // Startup already rotated.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {
                let file = log.clone();
                match tokio::task::spawn_blocking(move || file.rotate()).await {
                    Ok(Ok(true)) => info!(path = %log.path().display(), "Log file rotated"),
                    Ok(Ok(false)) => {}
                    Ok(Err(err)) => {
                        warn!(path = %log.path().display(), error = %err, "Log rotation failed");
                    }
                    Err(err) => warn!(error = %err, "Log rotation task did not complete"),
                }
            }
        }
    }
}

/// Rotate `log_path` if its size reaches `max_bytes`.
///
/// Rotation sequence (oldest first):
///   `<name>.<max_files>` deleted
///   `<name>.<n>` → `<name>.<n+1>` for n = max_files-1 … 1
///   `<name>` → `<name>.1`
///
/// Returns `true` if rotation occurred, `false` if the file was under the
/// threshold or did not exist yet.
pub fn rotate_if_needed(log_path: &Path, max_bytes: u64, max_files: usize) -> io::Result<bool> {
    let size = match fs::metadata(log_path) {
        Ok(meta) => meta.len(),
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };

    if size < max_bytes || max_files == 0 {
        return Ok(false);
    }

    let oldest = numbered_path(log_path, max_files);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }

    for n in (1..max_files).rev() {
        let src = numbered_path(log_path, n);
        if src.exists() {
            fs::rename(&src, numbered_path(log_path, n + 1))?;
        }
    }

    fs::rename(log_path, numbered_path(log_path, 1))?;
    Ok(true)
}

/// Path of the `n`-th rotated copy of `base` (e.g. `diskmirror.log.2`)
fn numbered_path(base: &Path, n: usize) -> PathBuf {
    let name = base
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("diskmirror.log");
    base.with_file_name(format!("{name}.{n}"))
}
