//! Term collection.
//!
//! Terms are values lifted out of a record's content: permission terms feed
//! authorization, storage terms feed persistence and index terms feed search.

use crate::error::Result;
use parking_lot::RwLock;
use recordgate_proto::{CollectedTerms, DataChild, DataGroup, IndexTerm, PermissionTerm, StorageTerm};
use std::collections::HashMap;

/// Collects the three term sets for a record.
pub trait TermCollector: Send + Sync {
    /// Collect terms from `record` as described by the metadata `metadata_id`.
    fn collect(&self, metadata_id: &str, record: &DataGroup) -> Result<CollectedTerms>;
}

/// What a term definition produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermKind {
    /// A permission term under this key.
    Permission {
        /// Key rules match against.
        permission_key: String,
    },
    /// A storage term under this key.
    Storage {
        /// Key the value is filed under.
        storage_key: String,
    },
    /// An index term of this field type.
    Index {
        /// Index field type.
        index_type: String,
    },
}

/// A term read from the value found at a name-in-data path.
///
/// The last path segment may name an atomic (its value is used) or a record
/// link (its linked id is used). Repeated children each yield a term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermDefinition {
    /// Term id.
    pub id: String,
    /// Path of child names from the record root.
    pub path: Vec<String>,
    /// Kind of term produced.
    pub kind: TermKind,
}

impl TermDefinition {
    /// Permission term definition.
    pub fn permission(id: impl Into<String>, path: &[&str], permission_key: impl Into<String>) -> Self {
        Self::with_kind(
            id,
            path,
            TermKind::Permission {
                permission_key: permission_key.into(),
            },
        )
    }

    /// Storage term definition.
    pub fn storage(id: impl Into<String>, path: &[&str], storage_key: impl Into<String>) -> Self {
        Self::with_kind(
            id,
            path,
            TermKind::Storage {
                storage_key: storage_key.into(),
            },
        )
    }

    /// Index term definition.
    pub fn index(id: impl Into<String>, path: &[&str], index_type: impl Into<String>) -> Self {
        Self::with_kind(
            id,
            path,
            TermKind::Index {
                index_type: index_type.into(),
            },
        )
    }

    fn with_kind(id: impl Into<String>, path: &[&str], kind: TermKind) -> Self {
        Self {
            id: id.into(),
            path: path.iter().map(|s| s.to_string()).collect(),
            kind,
        }
    }
}

/// Term collector driven by per-metadata path definitions.
#[derive(Debug, Default)]
pub struct FieldTermCollector {
    definitions: RwLock<HashMap<String, Vec<TermDefinition>>>,
}

impl FieldTermCollector {
    /// Create a collector with no definitions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a term definition for a metadata id.
    pub fn define(&self, metadata_id: impl Into<String>, definition: TermDefinition) {
        self.definitions
            .write()
            .entry(metadata_id.into())
            .or_default()
            .push(definition);
    }
}

impl TermCollector for FieldTermCollector {
    fn collect(&self, metadata_id: &str, record: &DataGroup) -> Result<CollectedTerms> {
        let definitions = self.definitions.read();
        let mut terms = CollectedTerms::new();
        let Some(definitions) = definitions.get(metadata_id) else {
            return Ok(terms);
        };

        for def in definitions {
            let mut values = Vec::new();
            values_at(record, &def.path, &mut values);
            for value in values {
                match &def.kind {
                    TermKind::Permission { permission_key } => terms
                        .permission_terms
                        .push(PermissionTerm::new(&def.id, value, permission_key)),
                    TermKind::Storage { storage_key } => {
                        terms.storage_terms.insert(StorageTerm {
                            id: def.id.clone(),
                            value,
                            storage_key: storage_key.clone(),
                        });
                    }
                    TermKind::Index { index_type } => {
                        terms.index_terms.insert(IndexTerm {
                            id: def.id.clone(),
                            value,
                            index_type: index_type.clone(),
                        });
                    }
                }
            }
        }
        Ok(terms)
    }
}

fn values_at(group: &DataGroup, path: &[String], out: &mut Vec<String>) {
    let Some((head, rest)) = path.split_first() else {
        return;
    };
    for child in group.children.iter().filter(|c| c.name_in_data() == head) {
        match (child, rest.is_empty()) {
            (DataChild::Group(g), false) => values_at(g, rest, out),
            (DataChild::Atomic(a), true) => out.push(a.value.clone()),
            (DataChild::RecordLink(l), true) => out.push(l.linked_record_id.clone()),
            _ => {}
        }
    }
}
