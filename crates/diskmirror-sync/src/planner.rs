//! Reconciliation planner
//!
//! Compares a local and a remote [`FileSnapshot`] and decides what has to
//! happen on the remote side for it to mirror the local folder:
//!
//! | Local | Remote | Action                                  |
//! |-------|--------|-----------------------------------------|
//! | yes   | no     | `Upload`                                |
//! | no    | yes    | `Delete`                                |
//! | yes   | yes    | `Overwrite` if local is strictly newer  |
//!
//! Equal timestamps, or a newer remote copy, produce no action: local
//! content never replaces an older-or-equal remote file.
//!
//! Names inside each bucket are sorted so that the same inputs always give
//! the same plan and the same log output.

use diskmirror_core::domain::{FileSnapshot, Plan};

/// Computes the plan that converges `remote` toward `local`
///
/// Pure function: no I/O, no clock access.
#[must_use]
pub fn plan(local: &FileSnapshot, remote: &FileSnapshot) -> Plan {
    let mut uploads = Vec::new();
    let mut overwrites = Vec::new();

    for (name, local_modified) in local {
        match remote.get(name) {
            None => uploads.push(name.clone()),
            Some(remote_modified) if local_modified > remote_modified => {
                overwrites.push(name.clone());
            }
            Some(_) => {}
        }
    }

    let mut deletes: Vec<String> = remote
        .names()
        .filter(|name| !local.contains(name))
        .map(str::to_owned)
        .collect();

    uploads.sort_unstable();
    deletes.sort_unstable();
    overwrites.sort_unstable();

    Plan::from_buckets(uploads, deletes, overwrites)
}
