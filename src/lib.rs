//! auditlog - audit trail for document collections
//!
//! This library records every insert, update, and remove performed on a
//! monitored document collection as an immutable audit record, and exposes
//! access-controlled, paginated, searchable reads over those records.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `audit`: Delta engine, event recorder, write observer and `AuditLog`
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `host`: In-memory reference collection with write hooks
//! - `models`: Audit records, record IDs and logger options
//! - `services`: Query service, argument validation and live feed
//! - `session`: Caller identity used for read access
//! - `storage`: Store capability with in-memory and JSONL backends
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use auditlog::{AuditLog, Caller, LogOptions, MemoryStore, Settings};
//! use auditlog::host::Collection;
//!
//! let log = AuditLog::new(Arc::new(MemoryStore::new()), &Settings::default())?;
//! let orders = Collection::new("orders");
//! log.add_logger(&orders, LogOptions::new().omit(["updatedAt"]));
//!
//! orders.insert(Some("u1"), json!({"_id": "o1", "total": 10}))?;
//! let records = log.query().list_all(&Caller::authenticated("u1"))?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod host;
pub mod models;
pub mod services;
pub mod session;
pub mod storage;

pub use audit::{AuditLog, DeltaEntry, EventRecorder, MonitoredCollection};
pub use config::{AuditPaths, Settings};
pub use error::{AuditError, AuditResult};
pub use models::{Action, AuditRecord, LogOptions, RecordId};
pub use services::{PageArgs, QueryService, Subscription};
pub use session::{Caller, CallerContext};
pub use storage::{AuditStore, JsonlStore, MemoryStore};
