//! Authorizer collaborator.

use super::caller::Caller;
use crate::error::Result;
use recordgate_proto::{Action, PermissionSet, PermissionTerm};

/// Evaluates whether a caller may perform an action on a record type.
///
/// Implementations must be safe for concurrent use; the enhancer adds no
/// synchronization of its own.
pub trait Authorizer: Send + Sync {
    /// Check `action` on `record_type` scoped by the record's permission
    /// terms, returning the record-part permissions the caller holds.
    ///
    /// Fails with `AuthorizationDenied` when the caller is not authorized at
    /// all. When `has_constraints` is false the returned set is empty. An
    /// empty set never means "all parts permitted".
    fn check_record_part_permissions(
        &self,
        caller: &Caller,
        action: Action,
        record_type: &str,
        permission_terms: &[PermissionTerm],
        has_constraints: bool,
    ) -> Result<PermissionSet>;

    /// Whether the caller may perform `action` on every record of the type.
    fn is_authorized_for_type(&self, caller: &Caller, action: Action, record_type: &str) -> bool;

    /// Whether the caller may perform `action` on a record of the type
    /// carrying these permission terms.
    fn is_authorized_for_type_and_terms(
        &self,
        caller: &Caller,
        action: Action,
        record_type: &str,
        permission_terms: &[PermissionTerm],
    ) -> bool;
}
