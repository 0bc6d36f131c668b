//! Record tree types.
//!
//! A record is an ordered tree of named groups and atomic values. Some
//! children are typed links: record links point at another record by type and
//! id, resource links point at a binary resource.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the group holding a record's identity.
pub const RECORD_INFO: &str = "recordInfo";
/// Name of the atomic holding a record's id inside [`RECORD_INFO`].
pub const RECORD_ID: &str = "id";
/// Name of the link naming a record's type inside [`RECORD_INFO`].
pub const RECORD_TYPE: &str = "type";

/// An atomic (leaf) value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataAtomic {
    /// Name of the value.
    pub name_in_data: String,
    /// The value itself.
    pub value: String,
    /// Repeat id when the value is part of a repeated sequence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_id: Option<String>,
    /// Attributes qualifying the value.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

/// A named group of children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataGroup {
    /// Name of the group.
    pub name_in_data: String,
    /// Repeat id when the group is part of a repeated sequence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_id: Option<String>,
    /// Attributes qualifying the group.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// Ordered children.
    #[serde(default)]
    pub children: Vec<DataChild>,
}

/// A reference to another record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRecordLink {
    /// Name of the link.
    pub name_in_data: String,
    /// Type of the linked record (may be an abstract parent type).
    pub linked_record_type: String,
    /// Id of the linked record.
    pub linked_record_id: String,
    /// Repeat id when the link is part of a repeated sequence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_id: Option<String>,
    /// Attributes qualifying the link.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// Whether the caller may read the linked record. Set by the enhancer.
    #[serde(default)]
    pub has_read_action: bool,
    /// Top-level group of the linked record. Set only by the decorator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_record: Option<Box<DataGroup>>,
}

/// A reference to a binary resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataResourceLink {
    /// Name of the link.
    pub name_in_data: String,
    /// Mime type of the resource.
    pub mime_type: String,
    /// Repeat id when the link is part of a repeated sequence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_id: Option<String>,
    /// Whether the caller may read the resource.
    #[serde(default)]
    pub has_read_action: bool,
}

/// Any child of a [`DataGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataChild {
    /// Leaf value.
    Atomic(DataAtomic),
    /// Nested group.
    Group(DataGroup),
    /// Link to another record.
    RecordLink(DataRecordLink),
    /// Link to a binary resource.
    ResourceLink(DataResourceLink),
}

impl DataChild {
    /// Name of the child.
    pub fn name_in_data(&self) -> &str {
        match self {
            DataChild::Atomic(a) => &a.name_in_data,
            DataChild::Group(g) => &g.name_in_data,
            DataChild::RecordLink(l) => &l.name_in_data,
            DataChild::ResourceLink(r) => &r.name_in_data,
        }
    }

    /// Attributes of the child. Resource links carry none.
    pub fn attributes(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            DataChild::Atomic(a) => Some(&a.attributes),
            DataChild::Group(g) => Some(&g.attributes),
            DataChild::RecordLink(l) => Some(&l.attributes),
            DataChild::ResourceLink(_) => None,
        }
    }
}

impl From<DataAtomic> for DataChild {
    fn from(atomic: DataAtomic) -> Self {
        DataChild::Atomic(atomic)
    }
}

impl From<DataGroup> for DataChild {
    fn from(group: DataGroup) -> Self {
        DataChild::Group(group)
    }
}

impl From<DataRecordLink> for DataChild {
    fn from(link: DataRecordLink) -> Self {
        DataChild::RecordLink(link)
    }
}

impl From<DataResourceLink> for DataChild {
    fn from(link: DataResourceLink) -> Self {
        DataChild::ResourceLink(link)
    }
}

impl DataAtomic {
    /// Create an atomic value.
    pub fn new(name_in_data: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name_in_data: name_in_data.into(),
            value: value.into(),
            repeat_id: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Set the repeat id.
    pub fn with_repeat_id(mut self, repeat_id: impl Into<String>) -> Self {
        self.repeat_id = Some(repeat_id.into());
        self
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

impl DataRecordLink {
    /// Create a link to `linked_record_type`/`linked_record_id`.
    pub fn new(
        name_in_data: impl Into<String>,
        linked_record_type: impl Into<String>,
        linked_record_id: impl Into<String>,
    ) -> Self {
        Self {
            name_in_data: name_in_data.into(),
            linked_record_type: linked_record_type.into(),
            linked_record_id: linked_record_id.into(),
            repeat_id: None,
            attributes: BTreeMap::new(),
            has_read_action: false,
            linked_record: None,
        }
    }

    /// Set the repeat id.
    pub fn with_repeat_id(mut self, repeat_id: impl Into<String>) -> Self {
        self.repeat_id = Some(repeat_id.into());
        self
    }

    /// Whether the decorator materialized the linked record.
    pub fn is_materialized(&self) -> bool {
        self.linked_record.is_some()
    }
}

impl DataResourceLink {
    /// Create a resource link.
    pub fn new(name_in_data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            name_in_data: name_in_data.into(),
            mime_type: mime_type.into(),
            repeat_id: None,
            has_read_action: false,
        }
    }
}

impl DataGroup {
    /// Create an empty group.
    pub fn new(name_in_data: impl Into<String>) -> Self {
        Self {
            name_in_data: name_in_data.into(),
            repeat_id: None,
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Create a record group with a `recordInfo` holding `id` and a `type` link.
    pub fn record(
        name_in_data: impl Into<String>,
        record_type: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        let info = DataGroup::new(RECORD_INFO)
            .with_child(DataAtomic::new(RECORD_ID, id))
            .with_child(DataRecordLink::new(RECORD_TYPE, "recordType", record_type));
        DataGroup::new(name_in_data).with_child(info)
    }

    /// Append a child.
    pub fn with_child(mut self, child: impl Into<DataChild>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Set the repeat id.
    pub fn with_repeat_id(mut self, repeat_id: impl Into<String>) -> Self {
        self.repeat_id = Some(repeat_id.into());
        self
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Append a child in place.
    pub fn add_child(&mut self, child: impl Into<DataChild>) {
        self.children.push(child.into());
    }

    /// Whether any direct child has the given name.
    pub fn contains_child(&self, name_in_data: &str) -> bool {
        self.children.iter().any(|c| c.name_in_data() == name_in_data)
    }

    /// First direct child group with the given name.
    pub fn first_group(&self, name_in_data: &str) -> Option<&DataGroup> {
        self.children.iter().find_map(|c| match c {
            DataChild::Group(g) if g.name_in_data == name_in_data => Some(g),
            _ => None,
        })
    }

    /// Value of the first direct atomic child with the given name.
    pub fn first_atomic_value(&self, name_in_data: &str) -> Option<&str> {
        self.children.iter().find_map(|c| match c {
            DataChild::Atomic(a) if a.name_in_data == name_in_data => Some(a.value.as_str()),
            _ => None,
        })
    }

    /// First direct record link with the given name.
    pub fn first_link(&self, name_in_data: &str) -> Option<&DataRecordLink> {
        self.children.iter().find_map(|c| match c {
            DataChild::RecordLink(l) if l.name_in_data == name_in_data => Some(l),
            _ => None,
        })
    }

    /// All direct record links with the given name.
    pub fn links_named<'a>(
        &'a self,
        name_in_data: &'a str,
    ) -> impl Iterator<Item = &'a DataRecordLink> + 'a {
        self.children.iter().filter_map(move |c| match c {
            DataChild::RecordLink(l) if l.name_in_data == name_in_data => Some(l),
            _ => None,
        })
    }

    /// Every record link in the tree, depth first.
    pub fn record_links(&self) -> Vec<&DataRecordLink> {
        let mut links = Vec::new();
        self.collect_record_links(&mut links);
        links
    }

    fn collect_record_links<'a>(&'a self, links: &mut Vec<&'a DataRecordLink>) {
        for child in &self.children {
            match child {
                DataChild::Group(g) => g.collect_record_links(links),
                DataChild::RecordLink(l) => links.push(l),
                _ => {}
            }
        }
    }

    /// Id from `recordInfo/id`.
    pub fn record_id(&self) -> Option<&str> {
        self.first_group(RECORD_INFO)?.first_atomic_value(RECORD_ID)
    }

    /// Type from the `recordInfo/type` link.
    pub fn record_type(&self) -> Option<&str> {
        self.first_group(RECORD_INFO)?
            .first_link(RECORD_TYPE)
            .map(|l| l.linked_record_id.as_str())
    }
}
