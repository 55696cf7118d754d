//! Reconciliation actions and plans
//!
//! An [`Action`] names a single file and what must happen to it on the
//! remote side. A [`Plan`] is the ordered list of actions for one cycle:
//! all uploads, then all deletions, then all overwrites. The ordering is
//! kept stable for readable logs; nothing depends on it for correctness.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

// ============================================================================
// Action
// ============================================================================

/// Discriminant of an [`Action`], used for counting and log fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Upload,
    Delete,
    Overwrite,
}

impl ActionKind {
    /// Lowercase label used in log fields and CLI output
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Upload => "upload",
            ActionKind::Delete => "delete",
            ActionKind::Overwrite => "overwrite",
        }
    }
}

impl Display for ActionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single step needed to converge the remote folder toward the local one
///
/// Carries only the file name. The executor resolves the local and remote
/// locations from the context it is given explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", content = "name", rename_all = "snake_case")]
pub enum Action {
    /// The file exists only locally and must be uploaded
    Upload(String),
    /// The file exists only remotely and must be removed
    Delete(String),
    /// The local copy is strictly newer and must replace the remote one
    Overwrite(String),
}

impl Action {
    /// The file name this action targets
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Action::Upload(name) | Action::Delete(name) | Action::Overwrite(name) => name,
        }
    }

    /// The kind of this action
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Action::Upload(_) => ActionKind::Upload,
            Action::Delete(_) => ActionKind::Delete,
            Action::Overwrite(_) => ActionKind::Overwrite,
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.name())
    }
}

// ============================================================================
// Plan
// ============================================================================

/// Ordered sequence of actions produced by one reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    actions: Vec<Action>,
}

impl Plan {
    /// Creates an empty plan
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a plan from its three buckets, preserving the
    /// upload → delete → overwrite order
    #[must_use]
    pub fn from_buckets(
        uploads: Vec<String>,
        deletes: Vec<String>,
        overwrites: Vec<String>,
    ) -> Self {
        let mut actions = Vec::with_capacity(uploads.len() + deletes.len() + overwrites.len());
        actions.extend(uploads.into_iter().map(Action::Upload));
        actions.extend(deletes.into_iter().map(Action::Delete));
        actions.extend(overwrites.into_iter().map(Action::Overwrite));
        Self { actions }
    }

    /// All actions in execution order
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Iterates over the actions in execution order
    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.actions.iter()
    }

    /// Number of actions in the plan
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns true if nothing needs to be done
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Names targeted by actions of the given kind
    pub fn names_of(&self, kind: ActionKind) -> impl Iterator<Item = &str> {
        self.actions
            .iter()
            .filter(move |action| action.kind() == kind)
            .map(Action::name)
    }

    /// Number of actions of the given kind
    #[must_use]
    pub fn count_of(&self, kind: ActionKind) -> usize {
        self.names_of(kind).count()
    }
}

impl FromIterator<Action> for Plan {
    fn from_iter<T: IntoIterator<Item = Action>>(iter: T) -> Self {
        Self {
            actions: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// Result of executing one action; used only for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure(String),
}

impl Outcome {
    /// Returns true for [`Outcome::Success`]
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    /// The failure reason, if any
    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Outcome::Success => None,
            Outcome::Failure(reason) => Some(reason),
        }
    }
}
