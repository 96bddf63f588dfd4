//! In-memory document collection
//!
//! A small host for the write observer: documents are JSON objects keyed by
//! `_id`, and after-write hooks run synchronously inside each write. A hook
//! error is returned from the write, which has already been applied.

use std::sync::RwLock;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::audit::{InsertHook, MonitoredCollection, RemoveHook, UpdateContext, UpdateHook};
use crate::error::{AuditError, AuditResult};
use crate::models::{document_id, ID_FIELD};

use super::modifier::apply_modifier;

#[derive(Default)]
struct Hooks {
    insert: Vec<InsertHook>,
    remove: Vec<RemoveHook>,
    update: Vec<UpdateHook>,
}

/// Named collection of JSON documents
pub struct Collection {
    name: Option<String>,
    docs: RwLock<Vec<Value>>,
    hooks: RwLock<Hooks>,
    track_previous: bool,
}

impl Collection {
    /// Create an empty collection
    pub fn new(name: impl Into<String>) -> Self {
        Self::build(Some(name.into()))
    }

    /// Create a collection that exposes no name to observers
    pub fn unnamed() -> Self {
        Self::build(None)
    }

    fn build(name: Option<String>) -> Self {
        Self {
            name,
            docs: RwLock::new(Vec::new()),
            hooks: RwLock::new(Hooks::default()),
            track_previous: true,
        }
    }

    /// Stop handing the pre-update document to update hooks
    pub fn without_previous_tracking(mut self) -> Self {
        self.track_previous = false;
        self
    }

    /// Insert a document, assigning `_id` when it has none
    ///
    /// Returns the document ID.
    pub fn insert(&self, actor: Option<&str>, doc: Value) -> AuditResult<String> {
        if !doc.is_object() {
            return Err(AuditError::InvalidArgument(format!(
                "document must be an object, got {}",
                doc
            )));
        }

        let mut doc = doc;
        if let Value::Object(map) = &mut doc {
            map.entry(ID_FIELD)
                .or_insert_with(|| Value::String(Uuid::new_v4().simple().to_string()));
        }
        let id = document_id(&doc)?;

        {
            let mut docs = self.write_docs()?;
            if Self::position(&docs, &id).is_some() {
                return Err(AuditError::InvalidArgument(format!(
                    "document '{}' already exists",
                    id
                )));
            }
            docs.push(doc.clone());
        }

        let hooks = self.read_hooks()?;
        for hook in &hooks.insert {
            hook(actor, &doc)?;
        }

        Ok(id)
    }

    /// Apply `modifier` to the document with `id`
    ///
    /// Returns `false` when no such document exists; no hooks run then.
    pub fn update(&self, actor: Option<&str>, id: &str, modifier: &Value) -> AuditResult<bool> {
        self.update_with_options(actor, id, modifier, &Value::Object(Map::new()))
    }

    /// Like [`Collection::update`], passing write options through to hooks
    pub fn update_with_options(
        &self,
        actor: Option<&str>,
        id: &str,
        modifier: &Value,
        options: &Value,
    ) -> AuditResult<bool> {
        let (previous, doc, field_names) = {
            let mut docs = self.write_docs()?;
            let Some(position) = Self::position(&docs, id) else {
                return Ok(false);
            };

            let previous = docs[position].clone();
            let mut doc = previous.clone();
            let field_names = apply_modifier(&mut doc, modifier)?;
            docs[position] = doc.clone();
            (previous, doc, field_names)
        };

        let ctx = UpdateContext {
            user_id: actor,
            doc: &doc,
            field_names: &field_names,
            modifier,
            options,
            previous: self.track_previous.then_some(&previous),
        };

        let hooks = self.read_hooks()?;
        for hook in &hooks.update {
            hook(&ctx)?;
        }

        Ok(true)
    }

    /// Remove the document with `id`, returning it
    pub fn remove(&self, actor: Option<&str>, id: &str) -> AuditResult<Option<Value>> {
        let removed = {
            let mut docs = self.write_docs()?;
            match Self::position(&docs, id) {
                Some(position) => docs.remove(position),
                None => return Ok(None),
            }
        };

        let hooks = self.read_hooks()?;
        for hook in &hooks.remove {
            hook(actor, &removed)?;
        }

        Ok(Some(removed))
    }

    /// Current version of the document with `id`
    pub fn find_one(&self, id: &str) -> AuditResult<Option<Value>> {
        let docs = self.docs.read().map_err(|e| {
            AuditError::Persistence(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(Self::position(&docs, id).map(|position| docs[position].clone()))
    }

    pub fn len(&self) -> AuditResult<usize> {
        let docs = self.docs.read().map_err(|e| {
            AuditError::Persistence(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(docs.len())
    }

    pub fn is_empty(&self) -> AuditResult<bool> {
        Ok(self.len()? == 0)
    }

    fn position(docs: &[Value], id: &str) -> Option<usize> {
        docs.iter()
            .position(|doc| document_id(doc).map(|doc_id| doc_id == id).unwrap_or(false))
    }

    fn write_docs(&self) -> AuditResult<std::sync::RwLockWriteGuard<'_, Vec<Value>>> {
        self.docs.write().map_err(|e| {
            AuditError::Persistence(format!("Failed to acquire write lock: {}", e))
        })
    }

    fn read_hooks(&self) -> AuditResult<std::sync::RwLockReadGuard<'_, Hooks>> {
        self.hooks.read().map_err(|e| {
            AuditError::Persistence(format!("Failed to acquire read lock: {}", e))
        })
    }

    fn register(&self, add: impl FnOnce(&mut Hooks)) {
        let mut hooks = match self.hooks.write() {
            Ok(hooks) => hooks,
            Err(poisoned) => poisoned.into_inner(),
        };
        add(&mut hooks);
    }
}

impl MonitoredCollection for Collection {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn after_insert(&self, hook: InsertHook) {
        self.register(|hooks| hooks.insert.push(hook));
    }

    fn after_remove(&self, hook: RemoveHook) {
        self.register(|hooks| hooks.remove.push(hook));
    }

    fn after_update(&self, hook: UpdateHook) {
        self.register(|hooks| hooks.update.push(hook));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_insert_assigns_id() {
        let collection = Collection::new("orders");
        let id = collection.insert(None, json!({"total": 10})).unwrap();

        assert_eq!(id.len(), 32);
        let doc = collection.find_one(&id).unwrap().unwrap();
        assert_eq!(doc["total"], json!(10));
    }

    #[test]
    fn test_insert_rejects_duplicates_and_non_objects() {
        let collection = Collection::new("orders");
        collection.insert(None, json!({"_id": "o1"})).unwrap();

        assert!(collection.insert(None, json!({"_id": "o1"})).is_err());
        assert!(collection
            .insert(None, json!([1, 2]))
            .unwrap_err()
            .is_invalid_argument());
        assert_eq!(collection.len().unwrap(), 1);
    }

    #[test]
    fn test_blank_id_rejected_before_write() {
        let collection = Collection::new("orders");
        let err = collection.insert(None, json!({"_id": "  ", "total": 1})).unwrap_err();

        assert!(err.is_validation());
        assert!(collection.is_empty().unwrap());
    }

    #[test]
    fn test_update_hook_sees_previous_and_fields() {
        let collection = Collection::new("orders");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        collection.after_update(Box::new(move |ctx: &UpdateContext<'_>| {
            sink.lock().unwrap().push((
                ctx.previous.cloned(),
                ctx.doc.clone(),
                ctx.field_names.to_vec(),
            ));
            Ok(())
        }));

        collection.insert(None, json!({"_id": "o1", "total": 10})).unwrap();
        assert!(collection
            .update(Some("u1"), "o1", &json!({"$set": {"total": 20}}))
            .unwrap());

        let seen = seen.lock().unwrap();
        let (previous, doc, fields) = &seen[0];
        assert_eq!(previous.as_ref().unwrap()["total"], json!(10));
        assert_eq!(doc["total"], json!(20));
        assert_eq!(fields, &vec!["total".to_string()]);
    }

    #[test]
    fn test_without_previous_tracking() {
        let collection = Collection::new("orders").without_previous_tracking();
        let had_previous = Arc::new(Mutex::new(None));
        let sink = had_previous.clone();
        collection.after_update(Box::new(move |ctx: &UpdateContext<'_>| {
            *sink.lock().unwrap() = Some(ctx.previous.is_some());
            Ok(())
        }));

        collection.insert(None, json!({"_id": "o1", "total": 10})).unwrap();
        collection.update(None, "o1", &json!({"$inc": {"total": 1}})).unwrap();

        assert_eq!(*had_previous.lock().unwrap(), Some(false));
    }

    #[test]
    fn test_update_and_remove_missing_document() {
        let collection = Collection::new("orders");
        assert!(!collection.update(None, "nope", &json!({"$set": {"a": 1}})).unwrap());
        assert!(collection.remove(None, "nope").unwrap().is_none());
    }

    #[test]
    fn test_bad_modifier_leaves_document_untouched() {
        let collection = Collection::new("orders");
        collection.insert(None, json!({"_id": "o1", "total": 10})).unwrap();

        let err = collection
            .update(None, "o1", &json!({"$set": {"status": "x"}, "$inc": {"status": 1}}))
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(
            collection.find_one("o1").unwrap().unwrap(),
            json!({"_id": "o1", "total": 10})
        );
    }

    #[test]
    fn test_hook_error_fails_write() {
        let collection = Collection::new("orders");
        collection.after_remove(Box::new(|_: Option<&str>, _: &Value| {
            Err(AuditError::Persistence("disk full".into()))
        }));

        collection.insert(None, json!({"_id": "o1"})).unwrap();
        let err = collection.remove(Some("u1"), "o1").unwrap_err();
        assert!(err.is_persistence());
    }
}
