//! Per-invocation memoization.
//!
//! One [`InvocationCache`] is created per top-level enhance call and passed by
//! reference through the whole link walk. Entries are write-once per key and
//! the cache is dropped when the call returns.

use crate::catalog::{TypeDescriptor, TypeProvider};
use crate::error::Result;
use recordgate_proto::DataGroup;
use std::collections::HashMap;
use std::sync::Arc;

/// Memoized link visibility decisions.
///
/// Lets the enhancer consult storage and the authorizer at most once per
/// record type and once per (type, id) pair within one invocation. Owned by
/// the invocation, never shared or handed in from outside.
#[derive(Debug, Default)]
pub(crate) struct LinkVisibilityCache {
    type_is_public: HashMap<String, bool>,
    link_authorized: HashMap<(String, String), bool>,
}

impl LinkVisibilityCache {
    /// Cached public-for-read flag of a type.
    pub(crate) fn type_is_public(&self, record_type: &str) -> Option<bool> {
        self.type_is_public.get(record_type).copied()
    }

    /// Cache the public-for-read flag of a type. The first value wins.
    pub(crate) fn set_type_is_public(&mut self, record_type: &str, public: bool) -> bool {
        *self
            .type_is_public
            .entry(record_type.to_string())
            .or_insert(public)
    }

    /// Cached read decision for a link target.
    pub(crate) fn link_authorized(&self, record_type: &str, id: &str) -> Option<bool> {
        self.link_authorized
            .get(&(record_type.to_string(), id.to_string()))
            .copied()
    }

    /// Cache the read decision for a link target. The first value wins.
    pub(crate) fn set_link_authorized(&mut self, record_type: &str, id: &str, authorized: bool) -> bool {
        *self
            .link_authorized
            .entry((record_type.to_string(), id.to_string()))
            .or_insert(authorized)
    }
}

/// Everything memoized during one enhance call.
#[derive(Default)]
pub(crate) struct InvocationCache {
    descriptors: HashMap<String, Arc<dyn TypeDescriptor>>,
    searches: HashMap<String, Option<DataGroup>>,
    pub(crate) links: LinkVisibilityCache,
}

impl InvocationCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Descriptor of a type, resolved through the provider once.
    pub(crate) fn descriptor(
        &mut self,
        types: &dyn TypeProvider,
        record_type: &str,
    ) -> Result<Arc<dyn TypeDescriptor>> {
        if let Some(descriptor) = self.descriptors.get(record_type) {
            return Ok(Arc::clone(descriptor));
        }
        let descriptor = types.type_descriptor(record_type)?;
        self.descriptors
            .insert(record_type.to_string(), Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Search record by id, read once; `None` when it does not exist.
    pub(crate) fn search<F>(&mut self, search_id: &str, read: F) -> Result<Option<DataGroup>>
    where
        F: FnOnce() -> Result<Option<DataGroup>>,
    {
        if let Some(search) = self.searches.get(search_id) {
            return Ok(search.clone());
        }
        let search = read()?;
        self.searches.insert(search_id.to_string(), search.clone());
        Ok(search)
    }
}
