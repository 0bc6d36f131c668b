//! In-memory record store.

use super::RecordStorage;
use crate::error::{Error, Result};
use dashmap::DashMap;
use recordgate_proto::DataGroup;

/// Concurrent in-memory store keyed by (type, id).
///
/// Incoming links are found by scanning the stored records' links, so the
/// store suits tests and small embedded data sets.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: DashMap<(String, String), DataGroup>,
}

impl MemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record, replacing any previous version.
    pub fn insert(&self, record_type: impl Into<String>, id: impl Into<String>, record: DataGroup) {
        self.records.insert((record_type.into(), id.into()), record);
    }

    /// Store a record under the type and id found in its `recordInfo`.
    pub fn insert_record(&self, record: DataGroup) -> Result<()> {
        let (Some(record_type), Some(id)) = (record.record_type(), record.record_id()) else {
            return Err(Error::InvalidData(format!(
                "record '{}' has no recordInfo type and id",
                record.name_in_data
            )));
        };
        let key = (record_type.to_string(), id.to_string());
        self.records.insert(key, record);
        Ok(())
    }

    /// Remove a record, returning it if present.
    pub fn remove(&self, record_type: &str, id: &str) -> Option<DataGroup> {
        self.records
            .remove(&(record_type.to_string(), id.to_string()))
            .map(|(_, record)| record)
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStorage for MemoryRecordStore {
    fn read(&self, types: &[String], id: &str) -> Result<DataGroup> {
        types
            .iter()
            .find_map(|t| self.records.get(&(t.clone(), id.to_string())))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::not_found(types.join(","), id))
    }

    fn links_exist_for_record(&self, record_type: &str, id: &str) -> Result<bool> {
        Ok(self.records.iter().any(|entry| {
            let (from_type, from_id) = entry.key();
            if from_type == record_type && from_id == id {
                return false;
            }
            entry
                .value()
                .record_links()
                .iter()
                .any(|l| l.linked_record_type == record_type && l.linked_record_id == id)
        }))
    }
}
