//! Type provider and in-memory catalog.

use super::descriptor::{RecordTypeDef, TypeDescriptor};
use crate::error::{Error, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Resolves record types to their descriptors.
pub trait TypeProvider: Send + Sync {
    /// Descriptor for the type. Unknown types fail with `UnknownRecordType`.
    fn type_descriptor(&self, record_type: &str) -> Result<Arc<dyn TypeDescriptor>>;

    /// The type plus every type implementing it, for reads of links declared
    /// against an abstract parent.
    fn implementing_types(&self, record_type: &str) -> Result<Vec<String>> {
        Ok(vec![record_type.to_string()])
    }
}

/// Thread-safe in-memory catalog of record type definitions.
#[derive(Debug, Default)]
pub struct TypeCatalog {
    types: RwLock<HashMap<String, Arc<RecordTypeDef>>>,
}

impl TypeCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog holding the given definitions.
    pub fn with_types(defs: impl IntoIterator<Item = RecordTypeDef>) -> Self {
        let catalog = Self::new();
        for def in defs {
            catalog.register(def);
        }
        catalog
    }

    /// Register (or replace) a definition.
    pub fn register(&self, def: RecordTypeDef) {
        self.types.write().insert(def.id.clone(), Arc::new(def));
    }

    /// Remove a definition, returning whether it existed.
    pub fn remove(&self, record_type: &str) -> bool {
        self.types.write().remove(record_type).is_some()
    }

    /// Get a definition by id.
    pub fn get(&self, record_type: &str) -> Option<Arc<RecordTypeDef>> {
        self.types.read().get(record_type).cloned()
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }
}

impl TypeProvider for TypeCatalog {
    fn type_descriptor(&self, record_type: &str) -> Result<Arc<dyn TypeDescriptor>> {
        self.get(record_type)
            .map(|def| def as Arc<dyn TypeDescriptor>)
            .ok_or_else(|| Error::UnknownRecordType(record_type.to_string()))
    }

    fn implementing_types(&self, record_type: &str) -> Result<Vec<String>> {
        let types = self.types.read();
        if !types.contains_key(record_type) {
            return Err(Error::UnknownRecordType(record_type.to_string()));
        }

        let mut result = vec![record_type.to_string()];
        let mut next = 0;
        while next < result.len() {
            let parent = result[next].clone();
            let mut children: Vec<String> = types
                .values()
                .filter(|def| def.parent_id.as_deref() == Some(parent.as_str()))
                .map(|def| def.id.clone())
                .filter(|id| !result.contains(id))
                .collect();
            children.sort();
            result.extend(children);
            next += 1;
        }
        Ok(result)
    }
}
