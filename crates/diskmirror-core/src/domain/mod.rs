//! Domain entities and business logic
//!
//! This module contains the core domain types for diskmirror:
//! - Newtypes for validated remote paths and cycle identifiers
//! - File snapshots describing one side of the mirror
//! - Reconciliation actions, plans and per-action outcomes
//! - Domain-specific error types

pub mod errors;
pub mod newtypes;
pub mod plan;
pub mod snapshot;

// Re-export commonly used types
pub use errors::DomainError;
pub use newtypes::{CycleId, RemotePath};
pub use plan::{Action, ActionKind, Outcome, Plan};
pub use snapshot::FileSnapshot;
