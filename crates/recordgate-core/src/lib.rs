//! recordgate core - action derivation, redaction and link decoration.
//!
//! Given a stored record and a caller, the engine decides which actions the
//! caller holds on it, strips the parts the caller may not read and tells
//! the client which of its links lead somewhere readable.
//!
//! # Modules
//!
//! - [`enhance`] - Record enhancer and its per-call link visibility cache
//! - [`decorate`] - Materializes readable links up to a depth
//! - [`catalog`] - Record type metadata
//! - [`security`] - Callers, authentication and authorization
//! - [`terms`] - Term collection from record content
//! - [`redact`] - Constraint-based field redaction
//! - [`storage`] - Record storage collaborator
//! - [`config`] - Engine configuration

pub mod catalog;
pub mod config;
pub mod decorate;
pub mod enhance;
pub mod error;
pub mod redact;
pub mod security;
pub mod storage;
pub mod terms;

pub use catalog::{RecordTypeDef, TypeCatalog, TypeDescriptor, TypeProvider};
pub use config::EnhancerConfig;
pub use decorate::RecordDecorator;
pub use enhance::RecordEnhancer;
pub use error::{AuthorizationDenied, Error, Result};
pub use redact::{ConstraintRedactor, Redactor};
pub use security::{
    Authenticator, Authorizer, Caller, PermissionRule, RuleAuthorizer, TermCondition,
    TokenAuthenticator, TypeScope,
};
pub use storage::{MemoryRecordStore, RecordStorage};
pub use terms::{FieldTermCollector, TermCollector, TermDefinition, TermKind};

/// Re-export protocol types.
pub use recordgate_proto as proto;
