//! The enhanced record handed back to orchestrators.

use crate::action::{Action, ActionSet};
use crate::data::DataGroup;
use crate::error::Error;
use crate::PermissionSet;
use serde::{Deserialize, Serialize};

/// An authorized, redacted view of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancedRecord {
    /// The (possibly redacted, possibly decorated) record data.
    pub record: DataGroup,
    /// Actions the caller holds on the record.
    pub actions: ActionSet,
    /// Record-part permissions granted for reading.
    #[serde(default)]
    pub read_permissions: PermissionSet,
    /// Record-part permissions granted for writing.
    #[serde(default)]
    pub write_permissions: PermissionSet,
}

impl EnhancedRecord {
    /// Wrap a record with no actions or permissions.
    pub fn new(record: DataGroup) -> Self {
        Self {
            record,
            actions: ActionSet::new(),
            read_permissions: PermissionSet::new(),
            write_permissions: PermissionSet::new(),
        }
    }

    /// Whether the caller holds the action.
    pub fn has_action(&self, action: Action) -> bool {
        self.actions.contains(action)
    }

    /// Record id from `recordInfo/id`.
    pub fn id(&self) -> Option<&str> {
        self.record.record_id()
    }

    /// Record type from `recordInfo/type`.
    pub fn record_type(&self) -> Option<&str> {
        self.record.record_type()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::Deserialization(e.to_string()))
    }
}
