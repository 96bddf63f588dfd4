//! Query service
//!
//! Read access to captured records. Every call checks the caller first:
//! unauthenticated callers get an empty, complete result rather than an
//! error, and simulated calls never reach the store.

use std::sync::Arc;

use crate::config::Settings;
use crate::error::{AuditError, AuditResult};
use crate::models::AuditRecord;
use crate::session::CallerContext;
use crate::storage::{AuditStore, FindOptions, RecordQuery, SortSpec};

use super::args::PageArgs;
use super::feed::{Feed, Subscription};

/// Page size bounds applied to paginated reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryLimits {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl QueryLimits {
    /// Resolve a requested limit: `0` is the default, anything else is clamped
    pub fn effective(&self, requested: usize) -> usize {
        let limit = if requested == 0 {
            self.default_page_size
        } else {
            requested
        };
        limit.min(self.max_page_size)
    }
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for QueryLimits {
    fn from(settings: &Settings) -> Self {
        Self {
            default_page_size: settings.default_page_size,
            max_page_size: settings.max_page_size,
        }
    }
}

/// Service for reading audit records
pub struct QueryService {
    store: Arc<dyn AuditStore>,
    feed: Feed,
    limits: QueryLimits,
}

impl QueryService {
    /// Create a query service over `store`, following `feed` for live updates
    pub fn new(store: Arc<dyn AuditStore>, feed: Feed, limits: QueryLimits) -> Self {
        Self {
            store,
            feed,
            limits,
        }
    }

    pub fn limits(&self) -> QueryLimits {
        self.limits
    }

    /// All records, newest first
    pub fn list_all(&self, caller: &dyn CallerContext) -> AuditResult<Subscription> {
        if !caller.is_authenticated() {
            tracing::debug!("list_all denied to unauthenticated caller");
            return Ok(Subscription::empty());
        }

        let query = RecordQuery::all();
        let options = FindOptions::new(SortSpec::newest_first());
        let receiver = self.feed.subscribe();
        let records = self.store.find(&query, &options)?;

        Ok(Subscription::live(records, receiver, query, options))
    }

    /// One page of records matching the optional search term
    pub fn list_page(
        &self,
        caller: &dyn CallerContext,
        args: &PageArgs,
    ) -> AuditResult<Subscription> {
        if !caller.is_authenticated() {
            tracing::debug!("list_page denied to unauthenticated caller");
            return Ok(Subscription::empty());
        }

        let query = RecordQuery::all().with_search(args.search.as_deref());
        let options =
            FindOptions::new(args.sort.clone()).with_limit(self.limits.effective(args.limit));

        let receiver = self.feed.subscribe();
        let records = self.store.find(&query, &options)?;

        Ok(Subscription::live(records, receiver, query, options))
    }

    /// Number of records matching the optional search term
    pub fn count(&self, caller: &dyn CallerContext, search: Option<&str>) -> AuditResult<u64> {
        if caller.is_simulation() {
            return Ok(0);
        }
        if !caller.is_authenticated() {
            tracing::debug!("count denied to unauthenticated caller");
            return Ok(0);
        }

        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.store.count(&RecordQuery::all().with_search(search))
    }

    /// Look up one record by full ID or `log-xxxxxxxx` short form
    ///
    /// Returns `None` for unauthenticated callers and unknown references.
    pub fn find_record(
        &self,
        caller: &dyn CallerContext,
        reference: &str,
    ) -> AuditResult<Option<AuditRecord>> {
        if !caller.is_authenticated() {
            tracing::debug!("find_record denied to unauthenticated caller");
            return Ok(None);
        }

        let reference = reference.trim();
        let mut matches: Vec<AuditRecord> = self
            .store
            .find(&RecordQuery::all(), &FindOptions::default())?
            .into_iter()
            .filter(|record| record.id.matches(reference))
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            n => Err(AuditError::InvalidArgument(format!(
                "Reference '{}' is ambiguous ({} records match)",
                reference, n
            ))),
        }
    }
}
