//! Caller identity and authorization.
//!
//! - [`Caller`]: the identity actions are derived for
//! - [`Authenticator`]: resolves auth tokens to callers
//! - [`Authorizer`]: evaluates whether a caller may perform an action
//! - [`RuleAuthorizer`]: role-based reference authorizer
//!
//! # Example
//!
//! ```ignore
//! use recordgate_core::security::{Caller, PermissionRule, RuleAuthorizer};
//!
//! let authorizer = RuleAuthorizer::new();
//! authorizer.grant("editor", PermissionRule::parse("read,update:place")?);
//!
//! let caller = Caller::new("user-1").with_role("editor");
//! assert!(authorizer.is_authorized_for_type(&caller, Action::Read, "place"));
//! ```

mod authenticator;
mod authorizer;
mod caller;
mod rules;

pub use authenticator::{Authenticator, TokenAuthenticator};
pub use authorizer::Authorizer;
pub use caller::Caller;
pub use rules::{PermissionRule, RuleAuthorizer, TermCondition, TypeScope};
