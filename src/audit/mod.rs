//! Audit capture for monitored collections
//!
//! Every insert, update, and remove on a monitored collection produces one
//! immutable record in an append-only store.
//!
//! # Architecture
//!
//! - `delta`: structural difference between two document versions
//! - `recorder`: builds and persists one record per observed write
//! - `observer`: registers after-write hooks on a host collection
//! - `log`: the `AuditLog` facade tying capture and queries together
//!
//! # Example
//!
//! ```rust,ignore
//! use auditlog::{AuditLog, LogOptions, MemoryStore, Settings};
//! use auditlog::host::Collection;
//!
//! let log = AuditLog::new(Arc::new(MemoryStore::new()), &Settings::default())?;
//! let orders = Collection::new("orders");
//! log.add_logger(&orders, LogOptions::new().omit(["updatedAt"]));
//!
//! orders.insert(Some("u1"), json!({"_id": "o1", "total": 10}))?;
//! ```

pub mod delta;
mod log;
pub mod observer;
pub mod recorder;

pub use delta::{compute_delta, summarize, ArrayItem, DeltaEntry, PathSegment};
pub use log::AuditLog;
pub use observer::{
    attach, InsertHook, MonitoredCollection, RemoveHook, UpdateContext, UpdateHook,
    UNKNOWN_COLLECTION,
};
pub use recorder::EventRecorder;
