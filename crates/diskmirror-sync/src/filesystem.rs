//! Local folder scanner
//!
//! Builds the local [`FileSnapshot`] with `tokio::fs`. Only the direct
//! entries of the folder are considered; sub-directories are skipped and
//! never descended into. Symbolic links count as files when they resolve
//! to a regular file.
//!
//! Modification times are converted from [`SystemTime`](std::time::SystemTime)
//! to UTC instants so they compare directly with remote timestamps.

use std::{io::ErrorKind, path::Path};

use chrono::{DateTime, Utc};
use diskmirror_core::domain::FileSnapshot;
use tracing::{debug, instrument, warn};

use crate::SyncError;

/// Scans the direct entries of `root` into a [`FileSnapshot`]
///
/// # Errors
/// - [`SyncError::LocalRootMissing`] if `root` does not exist or is not a directory
/// - [`SyncError::LocalScan`] if the directory cannot be enumerated
///
/// Problems with a single entry (vanished mid-scan, unreadable metadata,
/// non UTF-8 name) only skip that entry.
#[instrument(skip(root), fields(root = %root.display()))]
pub async fn scan_local_snapshot(root: &Path) -> Result<FileSnapshot, SyncError> {
    match tokio::fs::metadata(root).await {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(SyncError::LocalRootMissing(root.to_path_buf())),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(SyncError::LocalRootMissing(root.to_path_buf()));
        }
        Err(source) => {
            return Err(SyncError::LocalScan {
                path: root.to_path_buf(),
                source,
            });
        }
    }

    let scan_err = |source| SyncError::LocalScan {
        path: root.to_path_buf(),
        source,
    };

    let mut snapshot = FileSnapshot::new();
    let mut entries = tokio::fs::read_dir(root).await.map_err(scan_err)?;

    while let Some(entry) = entries.next_entry().await.map_err(scan_err)? {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            warn!(name = ?file_name, "Skipping entry with non UTF-8 name");
            continue;
        };

        // Follows symlinks, unlike DirEntry::metadata.
        let metadata = match tokio::fs::metadata(entry.path()).await {
            Ok(m) => m,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(file = name, "Entry vanished during scan");
                continue;
            }
            Err(err) => {
                warn!(file = name, error = %err, "Skipping unreadable entry");
                continue;
            }
        };

        if !metadata.is_file() {
            debug!(file = name, "Skipping non-file entry");
            continue;
        }

        let modified = match metadata.modified() {
            Ok(t) => DateTime::<Utc>::from(t),
            Err(err) => {
                warn!(file = name, error = %err, "Modification time unavailable");
                continue;
            }
        };

        snapshot.insert(name, modified);
    }

    debug!(files = snapshot.len(), "Local snapshot built");
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use filetime::FileTime;

    use super::*;

    fn touch(path: &Path, unix_secs: i64) {
        std::fs::write(path, b"content").unwrap();
        filetime::set_file_mtime(path, FileTime::from_unix_time(unix_secs, 0)).unwrap();
    }

    #[tokio::test]
    async fn test_scan_collects_files_with_utc_mtime() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.txt"), 1_700_000_000);
        touch(&dir.path().join("b.bin"), 1_600_000_000);

        let snapshot = scan_local_snapshot(dir.path()).await.unwrap();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            snapshot.get("a.txt"),
            Some(&Utc.timestamp_opt(1_700_000_000, 0).unwrap())
        );
        assert_eq!(
            snapshot.get("b.bin"),
            Some(&Utc.timestamp_opt(1_600_000_000, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_scan_skips_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("top.txt"), 1_700_000_000);
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        touch(&dir.path().join("nested").join("inner.txt"), 1_700_000_000);

        let snapshot = scan_local_snapshot(dir.path()).await.unwrap();

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains("top.txt"));
        assert!(!snapshot.contains("nested"));
        assert!(!snapshot.contains("inner.txt"));
    }

    #[tokio::test]
    async fn test_scan_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = scan_local_snapshot(dir.path()).await.unwrap();
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_scan_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");

        let err = scan_local_snapshot(&missing).await.unwrap_err();
        assert!(matches!(err, SyncError::LocalRootMissing(p) if p == missing));
    }

    #[tokio::test]
    async fn test_scan_root_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        touch(&file, 1_700_000_000);

        let err = scan_local_snapshot(&file).await.unwrap_err();
        assert!(matches!(err, SyncError::LocalRootMissing(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_scan_follows_file_symlinks_only() {
        let dir = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        touch(&outside.path().join("target.txt"), 1_700_000_000);
        std::os::unix::fs::symlink(outside.path().join("target.txt"), dir.path().join("link.txt"))
            .unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("dir-link")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("nowhere"), dir.path().join("dangling"))
            .unwrap();

        let snapshot = scan_local_snapshot(dir.path()).await.unwrap();

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains("link.txt"));
    }
}
