//! Record storage collaborator.
//!
//! Persistence is owned by the orchestrators; the engine only reads records
//! and asks the reverse-link index whether a record is linked to.

mod memory;

pub use memory::MemoryRecordStore;

use crate::error::Result;
use recordgate_proto::DataGroup;

/// Read access to stored records.
pub trait RecordStorage: Send + Sync {
    /// Read the record `id` stored under any of `types`.
    ///
    /// Fails with `NotFound` when no such record exists.
    fn read(&self, types: &[String], id: &str) -> Result<DataGroup>;

    /// Whether any other record links to `record_type`/`id`.
    fn links_exist_for_record(&self, record_type: &str, id: &str) -> Result<bool>;
}
