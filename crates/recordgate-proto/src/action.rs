//! Actions a caller may perform on a record.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A capability a caller may or may not hold for a given record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Read the record.
    Read,
    /// Update the record.
    Update,
    /// Delete the record.
    Delete,
    /// Create records of the type a `recordType` record describes.
    Create,
    /// List records of the described type.
    List,
    /// Run a search.
    Search,
    /// Reindex this record.
    Index,
    /// Reindex every record of the described type.
    BatchIndex,
    /// Upload a binary resource.
    Upload,
    /// Validate records of the described type.
    Validate,
    /// Read the links pointing at this record.
    ReadIncomingLinks,
}

impl Action {
    /// All actions, in canonical order.
    pub const ALL: [Action; 11] = [
        Action::Read,
        Action::Update,
        Action::Delete,
        Action::Create,
        Action::List,
        Action::Search,
        Action::Index,
        Action::BatchIndex,
        Action::Upload,
        Action::Validate,
        Action::ReadIncomingLinks,
    ];

    /// Lowercase name used by authorizers and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Create => "create",
            Action::List => "list",
            Action::Search => "search",
            Action::Index => "index",
            Action::BatchIndex => "batch_index",
            Action::Upload => "upload",
            Action::Validate => "validate",
            Action::ReadIncomingLinks => "read_incoming_links",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .iter()
            .copied()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| Error::UnknownAction(s.to_string()))
    }
}

/// The set of actions attached to an enhanced record.
///
/// `Index` and `BatchIndex` are mutually exclusive: inserting one removes the
/// other. Deserialized sets go through the same insertion, so a set naming
/// both keeps `BatchIndex`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeSet<Action>", into = "BTreeSet<Action>")]
pub struct ActionSet {
    actions: BTreeSet<Action>,
}

impl ActionSet {
    /// Create an empty action set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action.
    pub fn insert(&mut self, action: Action) {
        match action {
            Action::Index => {
                self.actions.remove(&Action::BatchIndex);
            }
            Action::BatchIndex => {
                self.actions.remove(&Action::Index);
            }
            _ => {}
        }
        self.actions.insert(action);
    }

    /// Remove an action, returning whether it was present.
    pub fn remove(&mut self, action: Action) -> bool {
        self.actions.remove(&action)
    }

    /// Check whether the action is present.
    pub fn contains(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }

    /// Iterate the actions in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        self.actions.iter().copied()
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        let mut set = ActionSet::new();
        for action in iter {
            set.insert(action);
        }
        set
    }
}

impl From<BTreeSet<Action>> for ActionSet {
    fn from(actions: BTreeSet<Action>) -> Self {
        actions.into_iter().collect()
    }
}

impl From<ActionSet> for BTreeSet<Action> {
    fn from(set: ActionSet) -> Self {
        set.actions
    }
}
