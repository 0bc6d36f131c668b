//! Core error types.

use recordgate_proto::Action;
use thiserror::Error;

/// The caller lacks authorization for the action being enforced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not authorized to {action} records of type '{record_type}'")]
pub struct AuthorizationDenied {
    /// Action that was denied.
    pub action: Action,
    /// Record type the action was checked against.
    pub record_type: String,
}

impl AuthorizationDenied {
    /// Create a denial for `action` on `record_type`.
    pub fn new(action: Action, record_type: impl Into<String>) -> Self {
        Self {
            action,
            record_type: record_type.into(),
        }
    }
}

/// Core engine errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Authorization denied for the primary action.
    #[error(transparent)]
    AuthorizationDenied(#[from] AuthorizationDenied),

    /// Record not found.
    #[error("record not found: {record_type}/{id}")]
    NotFound {
        /// Type (or types, comma separated) searched.
        record_type: String,
        /// Record id.
        id: String,
    },

    /// The type provider has no descriptor for the type.
    #[error("unknown record type: {0}")]
    UnknownRecordType(String),

    /// Storage collaborator failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Term collector failure.
    #[error("term collection error: {0}")]
    TermCollection(String),

    /// Record data is missing required parts.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Auth token could not be resolved to a caller.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Proto error.
    #[error("proto error: {0}")]
    Proto(#[from] recordgate_proto::Error),
}

impl Error {
    /// Create a not-found error.
    pub fn not_found(record_type: impl Into<String>, id: impl Into<String>) -> Self {
        Error::NotFound {
            record_type: record_type.into(),
            id: id.into(),
        }
    }

    /// Whether this is an authorization denial.
    pub fn is_authorization_denied(&self) -> bool {
        matches!(self, Error::AuthorizationDenied(_))
    }

    /// Whether this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
