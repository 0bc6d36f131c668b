//! Caller identity.

use std::collections::BTreeSet;

/// Role every caller carries, including unauthenticated ones.
pub const GUEST_ROLE: &str = "guest";

/// The identity actions and permissions are derived for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// User id.
    pub id: String,
    /// Roles granted to the user.
    pub roles: BTreeSet<String>,
}

impl Caller {
    /// Create a caller with only the guest role.
    pub fn new(id: impl Into<String>) -> Self {
        let mut roles = BTreeSet::new();
        roles.insert(GUEST_ROLE.to_string());
        Self { id: id.into(), roles }
    }

    /// Unauthenticated caller.
    pub fn guest() -> Self {
        Self::new("guest")
    }

    /// Add a role.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    /// Add several roles.
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    /// Whether the caller has the role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}
