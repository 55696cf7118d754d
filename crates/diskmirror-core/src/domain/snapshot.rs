//! File snapshots
//!
//! A [`FileSnapshot`] captures one side of the mirror (local folder or
//! remote folder) at a point in time: a mapping from file name to the
//! instant the file was last modified. Snapshots are rebuilt on every
//! cycle and never persisted.

use std::collections::{hash_map, HashMap};

use chrono::{DateTime, Utc};

use crate::ports::remote_store::{EntryKind, RemoteEntry};

/// Mapping from file name to last-modified instant for one side
///
/// Names are unique and flat (no path separators); timestamps are
/// normalized to UTC so local and remote values compare directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSnapshot {
    entries: HashMap<String, DateTime<Utc>>,
}

impl FileSnapshot {
    /// Creates an empty snapshot
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the remote snapshot from a folder listing
    ///
    /// Only entries whose kind is [`EntryKind::File`] are kept; sub-folders
    /// are not part of a flat mirror.
    pub fn from_remote_listing<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = RemoteEntry>,
    {
        entries
            .into_iter()
            .filter(|entry| entry.kind == EntryKind::File)
            .map(|entry| (entry.name, entry.modified))
            .collect()
    }

    /// Records `name` with its modification instant, replacing any previous value
    pub fn insert(&mut self, name: impl Into<String>, modified: DateTime<Utc>) {
        self.entries.insert(name.into(), modified);
    }

    /// Returns the modification instant recorded for `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DateTime<Utc>> {
        self.entries.get(name)
    }

    /// Returns true if `name` is present in this snapshot
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Removes `name` from the snapshot, returning its instant if present
    pub fn remove(&mut self, name: &str) -> Option<DateTime<Utc>> {
        self.entries.remove(name)
    }

    /// Number of files in the snapshot
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the snapshot holds no files
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the file names (in arbitrary order)
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over `(name, modified)` pairs (in arbitrary order)
    pub fn iter(&self) -> hash_map::Iter<'_, String, DateTime<Utc>> {
        self.entries.iter()
    }
}

impl FromIterator<(String, DateTime<Utc>)> for FileSnapshot {
    fn from_iter<T: IntoIterator<Item = (String, DateTime<Utc>)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FileSnapshot {
    type Item = (&'a String, &'a DateTime<Utc>);
    type IntoIter = hash_map::Iter<'a, String, DateTime<Utc>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
