//! Terms collected from a record's content.
//!
//! One collection yields three sets: permission terms drive authorization,
//! storage terms drive persistence filtering and index terms drive search
//! indexing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A unit of fine-grained access derived from record content.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PermissionTerm {
    /// Id of the term definition.
    pub id: String,
    /// Value found in the record.
    pub value: String,
    /// Key rules match against (e.g. `OWNING_ORGANISATION`).
    pub permission_key: String,
}

/// A value persisted alongside the record for storage-side filtering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StorageTerm {
    /// Id of the term definition.
    pub id: String,
    /// Value found in the record.
    pub value: String,
    /// Storage key the value is filed under.
    pub storage_key: String,
}

/// A value handed to the search index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndexTerm {
    /// Id of the term definition.
    pub id: String,
    /// Value found in the record.
    pub value: String,
    /// Index field type.
    pub index_type: String,
}

/// Terms collected once per (metadata id, record) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedTerms {
    /// Terms used for authorization.
    pub permission_terms: Vec<PermissionTerm>,
    /// Terms used for persistence.
    pub storage_terms: BTreeSet<StorageTerm>,
    /// Terms used for search indexing.
    pub index_terms: BTreeSet<IndexTerm>,
}

impl PermissionTerm {
    /// Create a permission term.
    pub fn new(
        id: impl Into<String>,
        value: impl Into<String>,
        permission_key: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
            permission_key: permission_key.into(),
        }
    }
}

impl CollectedTerms {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Values of permission terms with the given key.
    pub fn permission_values<'a>(&'a self, permission_key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.permission_terms
            .iter()
            .filter(move |t| t.permission_key == permission_key)
            .map(|t| t.value.as_str())
    }
}
