//! Audit log facade
//!
//! Wires a store, a recorder, a live feed, and the query service together.
//! One `AuditLog` is shared by every monitored collection of a host.

use std::sync::Arc;

use crate::config::Settings;
use crate::error::AuditResult;
use crate::models::LogOptions;
use crate::services::feed::Feed;
use crate::services::query::{QueryLimits, QueryService};
use crate::storage::{AuditStore, IndexField};

use super::observer::{attach, MonitoredCollection};
use super::recorder::EventRecorder;

/// Entry point of the audit add-on
pub struct AuditLog {
    recorder: Arc<EventRecorder>,
    query: QueryService,
}

impl AuditLog {
    /// Build an audit log over `store`
    ///
    /// Creates the `userId` and `docId` indexes if they are missing.
    pub fn new(store: Arc<dyn AuditStore>, settings: &Settings) -> AuditResult<Self> {
        store.ensure_index(IndexField::UserId)?;
        store.ensure_index(IndexField::DocId)?;

        let feed = Feed::new();
        let recorder = Arc::new(EventRecorder::new(store.clone()).with_feed(feed.clone()));
        let query = QueryService::new(store, feed, QueryLimits::from(settings));

        Ok(Self { recorder, query })
    }

    /// Start auditing writes to `collection`
    ///
    /// Returns the collection name stamped on its records.
    pub fn add_logger<C>(&self, collection: &C, options: LogOptions) -> String
    where
        C: MonitoredCollection + ?Sized,
    {
        attach(self.recorder.clone(), collection, options)
    }

    pub fn query(&self) -> &QueryService {
        &self.query
    }

    pub fn recorder(&self) -> &EventRecorder {
        &self.recorder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_new_creates_indexes() {
        let store = Arc::new(MemoryStore::new());
        AuditLog::new(store.clone(), &Settings::default()).unwrap();

        let mut fields = store.indexed_fields().unwrap();
        fields.sort_by_key(|field| field.as_str());
        assert_eq!(fields, vec![IndexField::DocId, IndexField::UserId]);
    }

    #[test]
    fn test_recorded_writes_reach_query_feed() {
        let store = Arc::new(MemoryStore::new());
        let log = AuditLog::new(store, &Settings::default()).unwrap();
        let caller = crate::session::Caller::authenticated("u1");

        let mut subscription = log.query().list_all(&caller).unwrap();
        log.recorder()
            .log_insert(
                Some("u1"),
                &serde_json::json!({"_id": "o1"}),
                "orders",
                &LogOptions::new(),
            )
            .unwrap();

        assert_eq!(subscription.try_next().unwrap().doc_id, "o1");
        assert_eq!(log.query().count(&caller, None).unwrap(), 1);
    }
}
