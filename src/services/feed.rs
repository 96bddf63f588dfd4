//! Live feed of newly captured records
//!
//! The push half of a subscription: the recorder publishes every persisted
//! record, and each open subscription holds a receiver.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use crate::models::{AuditRecord, RecordId};
use crate::storage::{FindOptions, RecordQuery, SortDirection};

/// Fan-out channel for captured records
///
/// Cloning shares the same subscriber list.
#[derive(Clone, Default)]
pub struct Feed {
    subscribers: Arc<Mutex<Vec<mpsc::Sender<AuditRecord>>>>,
}

impl Feed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new receiver for records published from now on
    pub fn subscribe(&self) -> mpsc::Receiver<AuditRecord> {
        let (sender, receiver) = mpsc::channel();
        match self.subscribers.lock() {
            Ok(mut subscribers) => subscribers.push(sender),
            Err(poisoned) => poisoned.into_inner().push(sender),
        }
        receiver
    }

    /// Send a record to every live subscriber, dropping closed ones
    pub fn publish(&self, record: &AuditRecord) {
        let mut subscribers = match self.subscribers.lock() {
            Ok(subscribers) => subscribers,
            Err(poisoned) => poisoned.into_inner(),
        };
        subscribers.retain(|sender| sender.send(record.clone()).is_ok());
    }

    /// Number of open subscribers
    pub fn subscriber_count(&self) -> usize {
        match self.subscribers.lock() {
            Ok(subscribers) => subscribers.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

/// Result of a subscribable query
///
/// Holds the current result page and, for authorized callers, a live channel
/// of records captured after the subscription opened. A subscription is
/// always ready: the initial page is complete when it is returned. Live
/// records are merged into the page under its sort and limit.
pub struct Subscription {
    records: Vec<AuditRecord>,
    live: Option<mpsc::Receiver<AuditRecord>>,
    filter: RecordQuery,
    options: FindOptions,
    /// IDs already delivered
    seen: HashSet<RecordId>,
}

impl Subscription {
    /// A subscription that carries a page and follows the feed
    ///
    /// The receiver should be opened before the page is read; records
    /// present in both are only delivered once.
    pub fn live(
        records: Vec<AuditRecord>,
        receiver: mpsc::Receiver<AuditRecord>,
        filter: RecordQuery,
        options: FindOptions,
    ) -> Self {
        let seen = records.iter().map(|record| record.id).collect();
        Self {
            records,
            live: Some(receiver),
            filter,
            options,
            seen,
        }
    }

    /// An empty, already complete subscription with no further updates
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            live: None,
            filter: RecordQuery::all(),
            options: FindOptions::default(),
            seen: HashSet::new(),
        }
    }

    /// Current page, including live records merged so far
    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<AuditRecord> {
        self.records
    }

    pub fn is_ready(&self) -> bool {
        true
    }

    /// Whether further updates can arrive
    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    /// Next pending live record that enters the page, without blocking
    ///
    /// Records that do not match the filter, or that would sort past the
    /// end of a full page, are skipped. An accepted record may push the
    /// last entry out of the page.
    pub fn try_next(&mut self) -> Option<AuditRecord> {
        loop {
            let record = self.live.as_ref()?.try_recv().ok()?;
            if self.seen.contains(&record.id) || !self.filter.matches(&record) {
                continue;
            }
            if self.admit(&record) {
                return Some(record);
            }
        }
    }

    /// Merge `record` into the page; `false` when it falls outside it
    fn admit(&mut self, record: &AuditRecord) -> bool {
        let sort = &self.options.sort;
        // Newer records sit before equal keys when the page runs descending
        let newer_first = sort.primary_direction() == SortDirection::Descending;
        let position = self
            .records
            .iter()
            .position(|existing| match sort.compare(record, existing) {
                Ordering::Less => true,
                Ordering::Equal => newer_first,
                Ordering::Greater => false,
            })
            .unwrap_or(self.records.len());

        if let Some(limit) = self.options.limit {
            if position >= limit {
                return false;
            }
        }

        self.seen.insert(record.id);
        self.records.insert(position, record.clone());
        if let Some(limit) = self.options.limit {
            self.records.truncate(limit);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{SortField, SortSpec};

    #[test]
    fn test_publish_reaches_subscribers() {
        let feed = Feed::new();
        let first = feed.subscribe();
        let second = feed.subscribe();

        feed.publish(&AuditRecord::insert(None, "orders", "o1"));

        assert_eq!(first.try_recv().unwrap().doc_id, "o1");
        assert_eq!(second.try_recv().unwrap().doc_id, "o1");
    }

    #[test]
    fn test_closed_subscribers_are_dropped() {
        let feed = Feed::new();
        let receiver = feed.subscribe();
        let _kept = feed.subscribe();
        drop(receiver);

        feed.publish(&AuditRecord::insert(None, "orders", "o1"));
        assert_eq!(feed.subscriber_count(), 1);
    }

    #[test]
    fn test_empty_subscription() {
        let mut subscription = Subscription::empty();
        assert!(subscription.is_ready());
        assert!(!subscription.is_live());
        assert!(subscription.records().is_empty());
        assert!(subscription.try_next().is_none());
    }

    #[test]
    fn test_live_subscription_filters_updates() {
        let feed = Feed::new();
        let mut subscription = Subscription::live(
            Vec::new(),
            feed.subscribe(),
            RecordQuery::all().with_search(Some("orders")),
            FindOptions::default(),
        );

        feed.publish(&AuditRecord::insert(None, "users", "p1"));
        feed.publish(&AuditRecord::insert(None, "orders", "o1"));

        assert_eq!(subscription.try_next().unwrap().doc_id, "o1");
        assert!(subscription.try_next().is_none());
    }

    #[test]
    fn test_initial_records_not_repeated() {
        let feed = Feed::new();
        let receiver = feed.subscribe();
        let record = AuditRecord::insert(None, "orders", "o1");
        feed.publish(&record);

        let mut subscription = Subscription::live(
            vec![record],
            receiver,
            RecordQuery::all(),
            FindOptions::default(),
        );
        assert_eq!(subscription.records().len(), 1);
        assert!(subscription.try_next().is_none());
    }

    #[test]
    fn test_full_page_only_admits_records_that_sort_inside() {
        let feed = Feed::new();
        let options = FindOptions::new(SortSpec::new().by(SortField::DocId, SortDirection::Ascending))
            .with_limit(2);
        let mut subscription = Subscription::live(
            vec![
                AuditRecord::insert(None, "orders", "b"),
                AuditRecord::insert(None, "orders", "d"),
            ],
            feed.subscribe(),
            RecordQuery::all(),
            options,
        );

        feed.publish(&AuditRecord::insert(None, "orders", "e"));
        feed.publish(&AuditRecord::insert(None, "orders", "a"));

        assert_eq!(subscription.try_next().unwrap().doc_id, "a");
        assert!(subscription.try_next().is_none());

        let docs: Vec<_> = subscription.records().iter().map(|r| r.doc_id.as_str()).collect();
        assert_eq!(docs, vec!["a", "b"]);
    }

    #[test]
    fn test_unsorted_page_stops_when_full() {
        let feed = Feed::new();
        let mut subscription = Subscription::live(
            Vec::new(),
            feed.subscribe(),
            RecordQuery::all(),
            FindOptions::default().with_limit(1),
        );

        for doc_id in ["o1", "o2", "o3"] {
            feed.publish(&AuditRecord::insert(None, "orders", doc_id));
        }

        assert_eq!(subscription.try_next().unwrap().doc_id, "o1");
        assert!(subscription.try_next().is_none());
        assert_eq!(subscription.records().len(), 1);
    }
}
