//! Storage layer for auditlog
//!
//! Defines the store capability the audit pipeline writes to and reads from,
//! plus two implementations: an in-memory store and an append-only JSONL
//! file.

pub mod file_io;
pub mod jsonl;
pub mod memory;
pub mod query;

pub use file_io::{read_json_required, write_json_atomic};
pub use jsonl::JsonlStore;
pub use memory::MemoryStore;
pub use query::{FindOptions, IndexField, RecordQuery, SortDirection, SortField, SortSpec};

use crate::error::AuditResult;
use crate::models::AuditRecord;

/// Backing store for audit records
///
/// Implementations must be thread-safe. Records are append-only, so there is
/// no update or delete operation.
pub trait AuditStore: Send + Sync {
    /// Persist a record
    ///
    /// # Errors
    ///
    /// Returns `Validation` for records that break the schema and
    /// `Persistence` when the backend rejects the write.
    fn insert(&self, record: &AuditRecord) -> AuditResult<()>;

    /// Records matching `query`, sorted and capped per `options`
    fn find(&self, query: &RecordQuery, options: &FindOptions) -> AuditResult<Vec<AuditRecord>>;

    /// Number of records matching `query`
    fn count(&self, query: &RecordQuery) -> AuditResult<u64>;

    /// Create an index on `field` if it does not exist yet
    fn ensure_index(&self, field: IndexField) -> AuditResult<()>;
}
