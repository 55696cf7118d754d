//! In-memory [`IRemoteStore`] used by the unit tests of this crate.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use chrono::{DateTime, Utc};
use diskmirror_core::{
    domain::RemotePath,
    ports::{EntryKind, FolderStatus, IRemoteStore, RemoteEntry, StoreError, UploadTarget},
};

const UPLOAD_PREFIX: &str = "fake://upload";

#[derive(Default)]
struct FakeState {
    folder_exists: bool,
    files: HashMap<String, (DateTime<Utc>, Vec<u8>)>,
    subfolders: Vec<String>,
    calls: Vec<String>,
    fail_ensure: bool,
    fail_listing: bool,
    fail_upload_target: HashSet<String>,
    fail_transfer: HashSet<String>,
    fail_delete: HashSet<String>,
}

/// Remote store fake that records every call and can be told to fail
#[derive(Default)]
pub(crate) struct FakeStore {
    state: Mutex<FakeState>,
}

impl FakeStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_folder(self) -> Self {
        self.state.lock().unwrap().folder_exists = true;
        self
    }

    pub(crate) fn with_file(self, name: &str, modified: DateTime<Utc>) -> Self {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(name.to_string(), (modified, Vec::new()));
        self
    }

    pub(crate) fn with_subfolder(self, name: &str) -> Self {
        self.state.lock().unwrap().subfolders.push(name.to_string());
        self
    }

    pub(crate) fn failing_ensure(self) -> Self {
        self.state.lock().unwrap().fail_ensure = true;
        self
    }

    pub(crate) fn failing_listing(self) -> Self {
        self.state.lock().unwrap().fail_listing = true;
        self
    }

    pub(crate) fn set_failing_listing(&self, fail: bool) {
        self.state.lock().unwrap().fail_listing = fail;
    }

    pub(crate) fn failing_upload_target(self, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_upload_target
            .insert(name.to_string());
        self
    }

    pub(crate) fn failing_transfer(self, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_transfer
            .insert(name.to_string());
        self
    }

    pub(crate) fn failing_delete(self, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_delete
            .insert(name.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn folder_exists(&self) -> bool {
        self.state.lock().unwrap().folder_exists
    }

    pub(crate) fn file_names(&self) -> HashSet<String> {
        self.state.lock().unwrap().files.keys().cloned().collect()
    }

    pub(crate) fn content_of(&self, name: &str) -> Option<Vec<u8>> {
        self.state
            .lock()
            .unwrap()
            .files
            .get(name)
            .map(|(_, data)| data.clone())
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }
}

fn name_of(path: &RemotePath) -> String {
    path.file_name().unwrap_or_default().to_string()
}

fn rejected(status: u16, message: &str) -> StoreError {
    StoreError::Rejected {
        status,
        message: message.to_string(),
    }
}

#[async_trait::async_trait]
impl IRemoteStore for FakeStore {
    async fn ensure_folder(&self, path: &RemotePath) -> Result<FolderStatus, StoreError> {
        self.record(format!("ensure_folder {path}"));
        let mut state = self.state.lock().unwrap();
        if state.fail_ensure {
            return Err(rejected(507, "Insufficient storage"));
        }
        if state.folder_exists {
            Ok(FolderStatus::Existed)
        } else {
            state.folder_exists = true;
            Ok(FolderStatus::Created)
        }
    }

    async fn list_files(&self, path: &RemotePath) -> Result<Vec<RemoteEntry>, StoreError> {
        self.record(format!("list_files {path}"));
        let state = self.state.lock().unwrap();
        if state.fail_listing {
            return Err(StoreError::Network("connection reset".to_string()));
        }
        let mut entries: Vec<RemoteEntry> = state
            .files
            .iter()
            .map(|(name, (modified, _))| RemoteEntry {
                name: name.clone(),
                kind: EntryKind::File,
                modified: *modified,
            })
            .collect();
        entries.extend(state.subfolders.iter().map(|name| RemoteEntry {
            name: name.clone(),
            kind: EntryKind::Directory,
            modified: DateTime::<Utc>::default(),
        }));
        Ok(entries)
    }

    async fn request_upload_target(
        &self,
        path: &RemotePath,
        overwrite: bool,
    ) -> Result<UploadTarget, StoreError> {
        self.record(format!("request_upload_target {path} overwrite={overwrite}"));
        let name = name_of(path);
        if self.state.lock().unwrap().fail_upload_target.contains(&name) {
            return Err(rejected(409, "Resource already exists"));
        }
        Ok(UploadTarget {
            href: format!("{UPLOAD_PREFIX}/{name}"),
            method: "PUT".to_string(),
        })
    }

    async fn transfer(&self, target: &UploadTarget, data: Vec<u8>) -> Result<(), StoreError> {
        self.record(format!("transfer {}", target.href));
        let name = target
            .href
            .strip_prefix(UPLOAD_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| StoreError::InvalidResponse(target.href.clone()))?
            .to_string();
        let mut state = self.state.lock().unwrap();
        if state.fail_transfer.contains(&name) {
            return Err(StoreError::Timeout(target.href.clone()));
        }
        state.files.insert(name, (Utc::now(), data));
        Ok(())
    }

    async fn delete(&self, path: &RemotePath) -> Result<(), StoreError> {
        self.record(format!("delete {path}"));
        let name = name_of(path);
        let mut state = self.state.lock().unwrap();
        if state.fail_delete.contains(&name) {
            return Err(rejected(423, "Resource is locked"));
        }
        match state.files.remove(&name) {
            Some(_) => Ok(()),
            None => Err(rejected(404, "Resource not found")),
        }
    }
}
