//! recordgate proto types.
//!
//! Plain data shared between the enhancement engine and the orchestrators
//! that call it. Every type derives serde `Serialize`/`Deserialize` so results
//! can be shipped as JSON unchanged.
//!
//! # Modules
//!
//! - [`data`] - Record tree: groups, atomics, record links and resource links
//! - [`action`] - Actions a caller may hold on a record
//! - [`terms`] - Permission, storage and index terms collected from a record
//! - [`constraint`] - Record-part constraints declared by a record type
//! - [`record`] - The enhanced record returned to callers
//! - [`error`] - Proto error types

pub mod action;
pub mod constraint;
pub mod data;
pub mod error;
pub mod record;
pub mod terms;

pub use error::Error;

pub use action::{Action, ActionSet};
pub use constraint::Constraint;
pub use data::{DataAtomic, DataChild, DataGroup, DataRecordLink, DataResourceLink};
pub use record::EnhancedRecord;
pub use terms::{CollectedTerms, IndexTerm, PermissionTerm, StorageTerm};

/// Permission identifiers a caller was found to hold for one action.
pub type PermissionSet = std::collections::BTreeSet<String>;
