//! Write observer
//!
//! Connects a monitored collection's after-write lifecycle to the event
//! recorder. The host collection only has to expose three callback
//! registrations and, for updates, hand over the previous version of the
//! document in the same callback.

use std::sync::Arc;

use serde_json::Value;

use crate::error::AuditResult;
use crate::models::LogOptions;

use super::recorder::EventRecorder;

/// Collection name used when the host exposes none
pub const UNKNOWN_COLLECTION: &str = "unknown";

/// Callback run after a document is inserted: `(actor, new document)`
pub type InsertHook = Box<dyn Fn(Option<&str>, &Value) -> AuditResult<()> + Send + Sync>;

/// Callback run after a document is removed: `(actor, removed document)`
pub type RemoveHook = Box<dyn Fn(Option<&str>, &Value) -> AuditResult<()> + Send + Sync>;

/// Callback run after a document is updated
pub type UpdateHook = Box<dyn Fn(&UpdateContext<'_>) -> AuditResult<()> + Send + Sync>;

/// Everything the host knows about a completed update
#[derive(Debug, Clone, Copy)]
pub struct UpdateContext<'a> {
    /// Actor that performed the write
    pub user_id: Option<&'a str>,
    /// Document as it exists after the write
    pub doc: &'a Value,
    /// Top-level fields touched by the modifier
    pub field_names: &'a [String],
    /// Modifier that was applied
    pub modifier: &'a Value,
    /// Write options passed by the caller
    pub options: &'a Value,
    /// Document as it existed before the write, when the host tracks it
    pub previous: Option<&'a Value>,
}

/// Host capability: a collection whose writes can be observed
///
/// Hooks run synchronously inside the write call, and an error returned by a
/// hook must fail that write.
pub trait MonitoredCollection {
    /// Collection name, if the host exposes one
    fn name(&self) -> Option<&str>;

    fn after_insert(&self, hook: InsertHook);

    fn after_remove(&self, hook: RemoveHook);

    fn after_update(&self, hook: UpdateHook);
}

/// Register the three audit hooks on `collection`
///
/// Returns the collection name the records will carry.
pub fn attach<C>(recorder: Arc<EventRecorder>, collection: &C, options: LogOptions) -> String
where
    C: MonitoredCollection + ?Sized,
{
    let collection_name = collection
        .name()
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_COLLECTION)
        .to_string();
    let options = Arc::new(options);

    {
        let recorder = recorder.clone();
        let name = collection_name.clone();
        let options = options.clone();
        collection.after_insert(Box::new(move |user_id: Option<&str>, doc: &Value| {
            recorder.log_insert(user_id, doc, &name, &options).map(|_| ())
        }));
    }

    {
        let recorder = recorder.clone();
        let name = collection_name.clone();
        let options = options.clone();
        collection.after_remove(Box::new(move |user_id: Option<&str>, doc: &Value| {
            recorder.log_remove(user_id, doc, &name, &options).map(|_| ())
        }));
    }

    {
        let name = collection_name.clone();
        let options = options.clone();
        collection.after_update(Box::new(move |ctx: &UpdateContext<'_>| {
            if ctx.previous.is_none() {
                tracing::warn!(
                    collection = %name,
                    "update observed without a previous snapshot; delta covers the whole document"
                );
            }
            recorder
                .log_update(ctx.user_id, ctx.doc, &name, &options, ctx.previous)
                .map(|_| ())
        }));
    }

    tracing::info!(collection = %collection_name, omit = ?options.omitted(), "audit logger attached");

    collection_name
}
