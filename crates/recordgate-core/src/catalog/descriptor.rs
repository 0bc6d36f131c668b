//! Type descriptors.

use recordgate_proto::Constraint;
use std::collections::BTreeSet;

/// Per-record-type metadata queried by the enhancer.
pub trait TypeDescriptor: Send + Sync + std::fmt::Debug {
    /// Record type id.
    fn id(&self) -> &str;

    /// Metadata id of the type's record definition.
    fn definition_id(&self) -> &str;

    /// Whether records of this type are readable without authorization.
    fn is_public_for_read(&self) -> bool;

    /// Parent type id, if the type implements an abstract parent.
    fn parent_id(&self) -> Option<&str>;

    /// Whether the type has a parent.
    fn has_parent(&self) -> bool {
        self.parent_id().is_some()
    }

    /// Constraints limiting which record parts callers may read.
    fn read_constraints(&self) -> &BTreeSet<Constraint>;

    /// Constraints limiting which record parts callers may write on create.
    fn create_write_constraints(&self) -> &BTreeSet<Constraint>;

    /// Constraints limiting which record parts callers may write on update.
    fn update_write_constraints(&self) -> &BTreeSet<Constraint>;

    /// Whether any read constraints are declared.
    fn has_read_constraints(&self) -> bool {
        !self.read_constraints().is_empty()
    }

    /// Whether any update constraints are declared.
    fn has_update_write_constraints(&self) -> bool {
        !self.update_write_constraints().is_empty()
    }

    /// Whether this is the meta-type whose records describe record types.
    fn represents_the_record_type_defining_record_types(&self) -> bool;

    /// Whether this is the type whose records define searches.
    fn represents_the_record_type_defining_searches(&self) -> bool;

    /// Id of the search linked to this type.
    fn search_id(&self) -> Option<&str>;

    /// Whether a search is linked to this type.
    fn has_linked_search(&self) -> bool {
        self.search_id().is_some()
    }
}

/// A record type definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTypeDef {
    /// Record type id (unique within the catalog).
    pub id: String,
    /// Metadata id of the record definition.
    pub definition_id: String,
    /// Records are readable by anyone.
    pub public: bool,
    /// Parent type id.
    pub parent_id: Option<String>,
    /// Read record-part constraints.
    pub read_constraints: BTreeSet<Constraint>,
    /// Create-write record-part constraints.
    pub create_write_constraints: BTreeSet<Constraint>,
    /// Update-write record-part constraints.
    pub update_write_constraints: BTreeSet<Constraint>,
    /// This type describes record types.
    pub defines_record_types: bool,
    /// This type defines searches.
    pub defines_searches: bool,
    /// Linked search id.
    pub search_id: Option<String>,
}

impl RecordTypeDef {
    /// Create a non-public type without constraints.
    pub fn new(id: impl Into<String>, definition_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            definition_id: definition_id.into(),
            public: false,
            parent_id: None,
            read_constraints: BTreeSet::new(),
            create_write_constraints: BTreeSet::new(),
            update_write_constraints: BTreeSet::new(),
            defines_record_types: false,
            defines_searches: false,
            search_id: None,
        }
    }

    /// Make records of the type publicly readable.
    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    /// Set the parent type.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Add a read constraint.
    ///
    /// Parts constrained for reading are also constrained for writing.
    pub fn with_read_constraint(mut self, constraint: Constraint) -> Self {
        self.create_write_constraints.insert(constraint.clone());
        self.update_write_constraints.insert(constraint.clone());
        self.read_constraints.insert(constraint);
        self
    }

    /// Add a write constraint for create and update.
    pub fn with_write_constraint(mut self, constraint: Constraint) -> Self {
        self.create_write_constraints.insert(constraint.clone());
        self.update_write_constraints.insert(constraint);
        self
    }

    /// Mark this as the meta-type describing record types.
    pub fn defining_record_types(mut self) -> Self {
        self.defines_record_types = true;
        self
    }

    /// Mark this as the type defining searches.
    pub fn defining_searches(mut self) -> Self {
        self.defines_searches = true;
        self
    }

    /// Link a search to the type.
    pub fn with_search(mut self, search_id: impl Into<String>) -> Self {
        self.search_id = Some(search_id.into());
        self
    }
}

impl TypeDescriptor for RecordTypeDef {
    fn id(&self) -> &str {
        &self.id
    }

    fn definition_id(&self) -> &str {
        &self.definition_id
    }

    fn is_public_for_read(&self) -> bool {
        self.public
    }

    fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    fn read_constraints(&self) -> &BTreeSet<Constraint> {
        &self.read_constraints
    }

    fn create_write_constraints(&self) -> &BTreeSet<Constraint> {
        &self.create_write_constraints
    }

    fn update_write_constraints(&self) -> &BTreeSet<Constraint> {
        &self.update_write_constraints
    }

    fn represents_the_record_type_defining_record_types(&self) -> bool {
        self.defines_record_types
    }

    fn represents_the_record_type_defining_searches(&self) -> bool {
        self.defines_searches
    }

    fn search_id(&self) -> Option<&str> {
        self.search_id.as_deref()
    }
}
