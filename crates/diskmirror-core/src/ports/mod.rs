//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are the interfaces the domain core depends on, while their
//! implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IRemoteStore`] - Remote folder operations (listing, upload, delete)

pub mod remote_store;

pub use remote_store::{EntryKind, FolderStatus, IRemoteStore, RemoteEntry, StoreError, UploadTarget};
