//! End-to-end capture and query through the reference collection.

use std::sync::Arc;

use auditlog::audit::DeltaEntry;
use auditlog::host::Collection;
use auditlog::storage::{FindOptions, RecordQuery, SortSpec};
use auditlog::{
    Action, AuditLog, AuditStore, Caller, JsonlStore, LogOptions, MemoryStore, PageArgs, Settings,
};
use serde_json::json;
use tempfile::TempDir;

fn orders_log() -> (AuditLog, Collection, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let log = AuditLog::new(store.clone(), &Settings::default()).unwrap();
    let orders = Collection::new("orders");
    log.add_logger(&orders, LogOptions::new().omit(["updatedAt"]));
    (log, orders, store)
}

#[test]
fn order_lifecycle_is_captured() {
    let (log, orders, store) = orders_log();

    orders
        .insert(Some("u1"), json!({"_id": "o1", "total": 10}))
        .unwrap();
    orders
        .update(
            Some("u1"),
            "o1",
            &json!({"$set": {"total": 20, "updatedAt": "2024-05-01T10:00:00Z"}}),
        )
        .unwrap();
    orders.remove(Some("u2"), "o1").unwrap();

    let records = store
        .find(&RecordQuery::all(), &FindOptions::default())
        .unwrap();
    assert_eq!(records.len(), 3);

    let actions: Vec<Action> = records.iter().map(|r| r.action).collect();
    assert_eq!(actions, vec![Action::Insert, Action::Update, Action::Remove]);
    assert!(records.iter().all(|r| r.collection == "orders" && r.doc_id == "o1"));

    assert!(records[0].delta.is_none());
    assert_eq!(records[0].user_id.as_deref(), Some("u1"));

    let delta = records[1].delta.as_ref().unwrap();
    assert_eq!(delta.len(), 1);
    match &delta[0] {
        DeltaEntry::Edited { lhs, rhs, .. } => {
            assert_eq!(delta[0].path_string(), "total");
            assert_eq!(lhs, &json!(10));
            assert_eq!(rhs, &json!(20));
        }
        other => panic!("expected an edit, got {:?}", other),
    }

    assert!(records[2].delta.is_none());
    assert_eq!(records[2].user_id.as_deref(), Some("u2"));

    let caller = Caller::authenticated("u1");
    assert_eq!(log.query().count(&caller, Some("ORDERS")).unwrap(), 3);
}

#[test]
fn omitted_only_update_has_empty_delta() {
    let (_log, orders, store) = orders_log();

    orders
        .insert(None, json!({"_id": "o1", "total": 10, "updatedAt": 1}))
        .unwrap();
    orders
        .update(None, "o1", &json!({"$set": {"updatedAt": 2}}))
        .unwrap();

    let updates = store
        .find(
            &RecordQuery::all().with_action(Action::Update),
            &FindOptions::default(),
        )
        .unwrap();
    assert_eq!(updates[0].delta, Some(vec![]));
}

#[test]
fn unauthenticated_reads_are_empty() {
    let (log, orders, _store) = orders_log();
    orders.insert(Some("u1"), json!({"_id": "o1"})).unwrap();

    let anonymous = Caller::anonymous();
    let all = log.query().list_all(&anonymous).unwrap();
    assert!(all.is_ready());
    assert!(all.records().is_empty());

    let page = log
        .query()
        .list_page(&anonymous, &PageArgs::new(SortSpec::newest_first(), 10))
        .unwrap();
    assert!(page.records().is_empty());
    assert_eq!(log.query().count(&anonymous, None).unwrap(), 0);
}

#[test]
fn simulated_count_is_zero() {
    let (log, orders, _store) = orders_log();
    orders.insert(Some("u1"), json!({"_id": "o1"})).unwrap();

    let simulated = Caller::authenticated("u1").simulated();
    assert_eq!(log.query().count(&simulated, None).unwrap(), 0);
    assert_eq!(
        log.query().count(&Caller::authenticated("u1"), None).unwrap(),
        1
    );
}

#[test]
fn live_subscription_sees_new_writes() {
    let (log, orders, _store) = orders_log();
    orders.insert(Some("u1"), json!({"_id": "o1"})).unwrap();

    let mut subscription = log.query().list_all(&Caller::authenticated("u1")).unwrap();
    assert_eq!(subscription.records().len(), 1);

    orders.insert(Some("u1"), json!({"_id": "o2"})).unwrap();
    let next = subscription.try_next().unwrap();
    assert_eq!(next.doc_id, "o2");
    assert_eq!(next.action, Action::Insert);
}

#[test]
fn several_collections_share_one_log() {
    let (log, orders, _store) = orders_log();
    let customers = Collection::unnamed();
    log.add_logger(&customers, LogOptions::new());

    orders.insert(Some("u1"), json!({"_id": "o1"})).unwrap();
    customers.insert(Some("u1"), json!({"_id": "c1"})).unwrap();

    let caller = Caller::authenticated("u1");
    let page = log
        .query()
        .list_page(&caller, &PageArgs::default().with_search("unknown"))
        .unwrap();
    assert_eq!(page.records().len(), 1);
    assert_eq!(page.records()[0].doc_id, "c1");
}

#[test]
fn jsonl_store_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("auditlog.jsonl");

    {
        let store = Arc::new(JsonlStore::open(path.clone()).unwrap());
        let log = AuditLog::new(store, &Settings::default()).unwrap();
        let orders = Collection::new("orders");
        log.add_logger(&orders, LogOptions::new());

        orders
            .insert(Some("u1"), json!({"_id": "o1", "total": 10}))
            .unwrap();
        orders
            .update(Some("u1"), "o1", &json!({"$inc": {"total": 5}}))
            .unwrap();
    }

    let reopened = Arc::new(JsonlStore::open(path.clone()).unwrap());
    let log = AuditLog::new(reopened, &Settings::default()).unwrap();
    let subscription = log.query().list_all(&Caller::authenticated("u1")).unwrap();

    let records = subscription.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].action, Action::Update);
    assert_eq!(records[0].delta.as_ref().unwrap()[0].path_string(), "total");
}
