//! Record-part constraints.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A record part whose visibility or writability is restricted.
///
/// The constraint names a top-level child of the record (optionally narrowed
/// by attributes). Callers need the constraint's permission key in their held
/// permission set to see or change that part.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Constraint {
    /// Name of the constrained child.
    pub name_in_data: String,
    /// Attributes the child must carry for the constraint to apply.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl Constraint {
    /// Create a constraint on the named child.
    pub fn new(name_in_data: impl Into<String>) -> Self {
        Self {
            name_in_data: name_in_data.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Narrow the constraint to children carrying this attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Permission identifier a caller must hold to pass the constraint.
    pub fn permission_key(&self) -> &str {
        &self.name_in_data
    }

    /// Whether a child with this name and these attributes is constrained.
    pub fn applies_to(&self, name_in_data: &str, attributes: Option<&BTreeMap<String, String>>) -> bool {
        if self.name_in_data != name_in_data {
            return false;
        }
        self.attributes.iter().all(|(name, value)| {
            attributes
                .and_then(|attrs| attrs.get(name))
                .map(|v| v == value)
                .unwrap_or(false)
        })
    }
}
