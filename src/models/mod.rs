//! Core data models for auditlog
//!
//! The persisted audit record, its identifier, per-collection options, and
//! helpers for the schemaless documents being observed.

pub mod document;
pub mod ids;
pub mod options;
pub mod record;

pub use document::{document_id, ID_FIELD};
pub use ids::RecordId;
pub use options::LogOptions;
pub use record::{Action, AuditRecord};
