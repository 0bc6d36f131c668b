//! Constraint-based redaction.
//!
//! A record type declares constraints naming record parts. Callers lacking
//! the constraint's permission do not see those parts, and may not change
//! them on update.

use crate::error::Result;
use recordgate_proto::{Constraint, DataChild, DataGroup, PermissionSet};
use std::collections::BTreeSet;
use tracing::trace;

/// Removes or restores record parts the caller lacks permissions for.
pub trait Redactor: Send + Sync {
    /// Copy of `record` without the children constrained by a constraint whose
    /// permission is missing from `held`.
    fn remove_unpermitted_fields(
        &self,
        metadata_id: &str,
        record: &DataGroup,
        constraints: &BTreeSet<Constraint>,
        held: &PermissionSet,
    ) -> Result<DataGroup>;

    /// Copy of `changed` in which constrained children the caller may not
    /// write are replaced by those of `original`.
    fn replace_unpermitted_fields(
        &self,
        metadata_id: &str,
        original: &DataGroup,
        changed: &DataGroup,
        constraints: &BTreeSet<Constraint>,
        held: &PermissionSet,
    ) -> Result<DataGroup>;
}

/// Redactor matching constraints against top-level record children.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintRedactor;

impl ConstraintRedactor {
    /// Create a redactor.
    pub fn new() -> Self {
        Self
    }

    /// Whether the child is covered by a constraint the caller lacks.
    fn is_unpermitted(child: &DataChild, constraints: &BTreeSet<Constraint>, held: &PermissionSet) -> bool {
        constraints.iter().any(|constraint| {
            !held.contains(constraint.permission_key())
                && constraint.applies_to(child.name_in_data(), child.attributes())
        })
    }
}

impl Redactor for ConstraintRedactor {
    fn remove_unpermitted_fields(
        &self,
        metadata_id: &str,
        record: &DataGroup,
        constraints: &BTreeSet<Constraint>,
        held: &PermissionSet,
    ) -> Result<DataGroup> {
        let mut redacted = record.clone();
        redacted.children.retain(|child| {
            let remove = Self::is_unpermitted(child, constraints, held);
            if remove {
                trace!(metadata_id, field = child.name_in_data(), "field redacted");
            }
            !remove
        });
        Ok(redacted)
    }

    fn replace_unpermitted_fields(
        &self,
        metadata_id: &str,
        original: &DataGroup,
        changed: &DataGroup,
        constraints: &BTreeSet<Constraint>,
        held: &PermissionSet,
    ) -> Result<DataGroup> {
        let mut replaced = self.remove_unpermitted_fields(metadata_id, changed, constraints, held)?;
        // Restored children go back to their position in the original.
        for (index, child) in original.children.iter().enumerate() {
            if Self::is_unpermitted(child, constraints, held) {
                trace!(metadata_id, field = child.name_in_data(), "field restored from original");
                let at = index.min(replaced.children.len());
                replaced.children.insert(at, child.clone());
            }
        }
        Ok(replaced)
    }
}
