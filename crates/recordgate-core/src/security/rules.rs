//! Role-based rule authorizer.
//!
//! Rules are granted to roles. A rule names the actions it allows, the record
//! types it covers and, optionally, permission-term conditions a record must
//! meet. Rules with term conditions never grant type-wide authorization.

use super::authorizer::Authorizer;
use super::caller::Caller;
use crate::error::{AuthorizationDenied, Error, Result};
use parking_lot::RwLock;
use recordgate_proto::{Action, PermissionSet, PermissionTerm};
use std::collections::{BTreeSet, HashMap};

/// Record types a rule covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeScope {
    /// Every record type.
    All,
    /// One record type.
    Type(String),
    /// Types matching a leading or trailing `*` pattern (e.g. `book*`).
    Pattern(String),
}

impl TypeScope {
    /// Check if this scope covers the record type.
    pub fn matches(&self, record_type: &str) -> bool {
        match self {
            TypeScope::All => true,
            TypeScope::Type(name) => name == record_type,
            TypeScope::Pattern(pattern) => {
                if let Some(prefix) = pattern.strip_suffix('*') {
                    record_type.starts_with(prefix)
                } else if let Some(suffix) = pattern.strip_prefix('*') {
                    record_type.ends_with(suffix)
                } else {
                    record_type == pattern
                }
            }
        }
    }

    fn parse(scope: Option<&str>) -> Self {
        match scope {
            None | Some("*") => TypeScope::All,
            Some(s) if s.contains('*') => TypeScope::Pattern(s.to_string()),
            Some(s) => TypeScope::Type(s.to_string()),
        }
    }
}

/// A record must carry a permission term with this key and one of the values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermCondition {
    /// Permission key to look for.
    pub permission_key: String,
    /// Accepted values.
    pub values: BTreeSet<String>,
}

impl TermCondition {
    /// Create a condition accepting the given values.
    pub fn new<I, S>(permission_key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            permission_key: permission_key.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    fn is_met_by(&self, terms: &[PermissionTerm]) -> bool {
        terms
            .iter()
            .any(|t| t.permission_key == self.permission_key && self.values.contains(&t.value))
    }
}

/// One grant of actions on record types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRule {
    /// Actions allowed.
    pub actions: BTreeSet<Action>,
    /// Record types covered.
    pub scope: TypeScope,
    /// Conditions on the record's permission terms (all must hold).
    pub term_conditions: Vec<TermCondition>,
    /// Record-part permissions granted alongside the actions.
    pub record_part_permissions: BTreeSet<String>,
}

impl PermissionRule {
    /// Create a rule allowing `actions` on `scope`.
    pub fn new(actions: impl IntoIterator<Item = Action>, scope: TypeScope) -> Self {
        Self {
            actions: actions.into_iter().collect(),
            scope,
            term_conditions: Vec::new(),
            record_part_permissions: BTreeSet::new(),
        }
    }

    /// Parse a rule from `actions:scope`.
    ///
    /// - actions: comma-separated action names
    /// - scope: `*` (all), a record type, or a pattern
    ///
    /// Examples:
    /// - `read:*` - read all types
    /// - `read,update:place` - read and update places
    /// - `index:book*` - index types starting with "book"
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.splitn(2, ':').collect();
        let actions = parts[0]
            .split(',')
            .map(|a| a.trim().parse::<Action>())
            .collect::<std::result::Result<BTreeSet<_>, _>>()?;
        if actions.is_empty() {
            return Err(Error::Config(format!("rule '{}' names no actions", s)));
        }
        Ok(Self::new(actions, TypeScope::parse(parts.get(1).copied())))
    }

    /// Require a permission term condition.
    pub fn with_term_condition(mut self, condition: TermCondition) -> Self {
        self.term_conditions.push(condition);
        self
    }

    /// Grant a record-part permission.
    pub fn with_record_part_permission(mut self, permission: impl Into<String>) -> Self {
        self.record_part_permissions.insert(permission.into());
        self
    }

    fn covers(&self, action: Action, record_type: &str) -> bool {
        self.actions.contains(&action) && self.scope.matches(record_type)
    }

    fn is_type_wide(&self) -> bool {
        self.term_conditions.is_empty()
    }

    fn is_met_by(&self, terms: &[PermissionTerm]) -> bool {
        self.term_conditions.iter().all(|c| c.is_met_by(terms))
    }
}

/// Authorizer evaluating role-granted [`PermissionRule`]s.
#[derive(Debug, Default)]
pub struct RuleAuthorizer {
    rules: RwLock<HashMap<String, Vec<PermissionRule>>>,
}

impl RuleAuthorizer {
    /// Create an authorizer with no grants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant a rule to a role.
    pub fn grant(&self, role: impl Into<String>, rule: PermissionRule) {
        self.rules.write().entry(role.into()).or_default().push(rule);
    }

    /// Parse and grant several `actions:scope` rules to a role.
    pub fn grant_all(&self, role: &str, rules: &[&str]) -> Result<()> {
        let parsed = rules
            .iter()
            .map(|r| PermissionRule::parse(r))
            .collect::<Result<Vec<_>>>()?;
        self.rules
            .write()
            .entry(role.to_string())
            .or_default()
            .extend(parsed);
        Ok(())
    }

    /// Drop every rule granted to a role.
    pub fn revoke_role(&self, role: &str) -> bool {
        self.rules.write().remove(role).is_some()
    }

    fn matching_rules<F>(&self, caller: &Caller, action: Action, record_type: &str, accept: F) -> Vec<PermissionRule>
    where
        F: Fn(&PermissionRule) -> bool,
    {
        let rules = self.rules.read();
        caller
            .roles
            .iter()
            .filter_map(|role| rules.get(role))
            .flatten()
            .filter(|rule| rule.covers(action, record_type) && accept(rule))
            .cloned()
            .collect()
    }
}

impl Authorizer for RuleAuthorizer {
    fn check_record_part_permissions(
        &self,
        caller: &Caller,
        action: Action,
        record_type: &str,
        permission_terms: &[PermissionTerm],
        has_constraints: bool,
    ) -> Result<PermissionSet> {
        let matching =
            self.matching_rules(caller, action, record_type, |rule| rule.is_met_by(permission_terms));
        if matching.is_empty() {
            return Err(AuthorizationDenied::new(action, record_type).into());
        }
        if !has_constraints {
            return Ok(PermissionSet::new());
        }
        Ok(matching
            .into_iter()
            .flat_map(|rule| rule.record_part_permissions)
            .collect())
    }

    fn is_authorized_for_type(&self, caller: &Caller, action: Action, record_type: &str) -> bool {
        !self
            .matching_rules(caller, action, record_type, PermissionRule::is_type_wide)
            .is_empty()
    }

    fn is_authorized_for_type_and_terms(
        &self,
        caller: &Caller,
        action: Action,
        record_type: &str,
        permission_terms: &[PermissionTerm],
    ) -> bool {
        !self
            .matching_rules(caller, action, record_type, |rule| rule.is_met_by(permission_terms))
            .is_empty()
    }
}
