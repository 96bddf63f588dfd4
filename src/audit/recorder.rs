//! Event recorder
//!
//! Builds exactly one audit record per observed write and persists it
//! synchronously. Failures from the store are returned to the caller as-is;
//! nothing here retries, batches, or defers.

use std::sync::Arc;

use serde_json::Value;

use crate::error::AuditResult;
use crate::models::{document_id, AuditRecord, LogOptions};
use crate::services::feed::Feed;
use crate::storage::AuditStore;

use super::delta::compute_delta;

/// Persists audit records for observed writes
pub struct EventRecorder {
    store: Arc<dyn AuditStore>,
    feed: Option<Feed>,
}

impl EventRecorder {
    /// Create a recorder writing to `store`
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store, feed: None }
    }

    /// Also publish every persisted record to `feed`
    pub fn with_feed(mut self, feed: Feed) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Record an insert of `doc`
    pub fn log_insert(
        &self,
        user_id: Option<&str>,
        doc: &Value,
        collection: &str,
        _options: &LogOptions,
    ) -> AuditResult<AuditRecord> {
        let record = AuditRecord::insert(user_id, collection, document_id(doc)?);
        self.persist(record)
    }

    /// Record the removal of `doc`, given as it was before removal
    pub fn log_remove(
        &self,
        user_id: Option<&str>,
        doc: &Value,
        collection: &str,
        _options: &LogOptions,
    ) -> AuditResult<AuditRecord> {
        let record = AuditRecord::remove(user_id, collection, document_id(doc)?);
        self.persist(record)
    }

    /// Record an update from `previous` to `doc`
    ///
    /// The delta skips fields listed in `options`. A missing `previous`
    /// snapshot is diffed as an absent document.
    pub fn log_update(
        &self,
        user_id: Option<&str>,
        doc: &Value,
        collection: &str,
        options: &LogOptions,
        previous: Option<&Value>,
    ) -> AuditResult<AuditRecord> {
        let delta = compute_delta(previous, doc, options.omitted());
        let record = AuditRecord::update(user_id, collection, document_id(doc)?, delta);
        self.persist(record)
    }

    fn persist(&self, record: AuditRecord) -> AuditResult<AuditRecord> {
        self.store.insert(&record)?;

        tracing::debug!(
            collection = %record.collection,
            doc_id = %record.doc_id,
            action = record.action.as_str(),
            "audit record persisted"
        );

        if let Some(feed) = &self.feed {
            feed.publish(&record);
        }

        Ok(record)
    }
}
