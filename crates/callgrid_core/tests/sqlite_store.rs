use callgrid_core::model::callpoint::Callpoint;
use callgrid_core::model::event::{Event, EV_TYPE_START, EV_SUB_TYPE_START_STEP1};
use callgrid_core::model::notification::Notification;
use callgrid_core::model::Kind;
use callgrid_core::store::{latest_version, DocumentStore, Query};
use callgrid_core::{
    CallgridConfig, Catalog, CoreError, OpContext, SqliteDocumentStore, StoreError,
};
use rusqlite::Connection;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

fn temp_db() -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("callgrid.sqlite3");
    (dir, path)
}

#[test]
fn file_store_applies_migrations_and_survives_reopen() {
    let (_dir, path) = temp_db();
    let ctx = OpContext::silent();

    let notification = {
        let store = SqliteDocumentStore::open(&path).unwrap();
        assert_eq!(store.schema_version().unwrap(), latest_version());
        let catalog = Catalog::new(Arc::new(store), &CallgridConfig::default());
        catalog
            .callpoints()
            .add(&ctx, &Callpoint::new("cp-1", "Lobby"))
            .unwrap();
        let notification = catalog
            .notifications()
            .add(&ctx, &Notification::new("ac-1", "hello"))
            .unwrap();
        catalog
            .events()
            .add(
                &ctx,
                &Event::new(&notification.nt_id, EV_TYPE_START, EV_SUB_TYPE_START_STEP1),
            )
            .unwrap();
        notification
    };

    let reopened = SqliteDocumentStore::open(&path).unwrap();
    assert_eq!(reopened.schema_version().unwrap(), latest_version());
    let catalog = Catalog::new(Arc::new(reopened), &CallgridConfig::default());

    let callpoints = catalog.callpoints().get_by_cp_id(&ctx, "cp-1").unwrap();
    assert_eq!(callpoints.len(), 1);
    assert_eq!(callpoints[0].label, "Lobby");

    let events = catalog
        .resolver()
        .list_events_by_action_id(&ctx, "ac-1")
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].nt_id, notification.nt_id);
    assert_eq!(events[0].ev_type, EV_TYPE_START);
}

#[test]
fn open_existing_refuses_to_create_a_missing_database() {
    let (_dir, path) = temp_db();

    let err = SqliteDocumentStore::open_existing(&path).unwrap_err();
    assert!(matches!(err, StoreError::Sqlite(_)));
    assert!(!path.exists());

    SqliteDocumentStore::open(&path).unwrap();
    let store = SqliteDocumentStore::open_existing(&path).unwrap();
    assert_eq!(store.schema_version().unwrap(), latest_version());
}

#[test]
fn newer_schema_version_is_rejected() {
    let (_dir, path) = temp_db();
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version() + 1))
            .unwrap();
    }

    let err = SqliteDocumentStore::open(&path).unwrap_err();
    assert!(matches!(
        err,
        StoreError::UnsupportedSchemaVersion { db_version, .. } if db_version == latest_version() + 1
    ));
}

#[test]
fn ids_are_not_reused_after_delete_and_reopen() {
    let (_dir, path) = temp_db();
    let first = {
        let store = SqliteDocumentStore::open(&path).unwrap();
        let first = store.put(Kind::Devices, &json!({"dvID": "dv-1"})).unwrap();
        store.delete(Kind::Devices, first).unwrap();
        first
    };

    let store = SqliteDocumentStore::open(&path).unwrap();
    let second = store.put(Kind::Devices, &json!({"dvID": "dv-1"})).unwrap();
    assert!(second > first);
    assert_eq!(store.get_all(&Query::all(Kind::Devices)).unwrap().len(), 1);
}

#[test]
fn delete_of_missing_record_is_not_found() {
    let store = Arc::new(SqliteDocumentStore::open_in_memory().unwrap());
    let catalog = Catalog::new(store, &CallgridConfig::default());

    let err = catalog
        .devices()
        .delete(&OpContext::silent(), 42)
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Store(StoreError::NotFound {
            kind: Kind::Devices,
            id: 42
        })
    ));
}

#[test]
fn kinds_do_not_share_documents() {
    let store = SqliteDocumentStore::open_in_memory().unwrap();
    store.put(Kind::Actions, &json!({"cpID": "cp-1"})).unwrap();
    store.put(Kind::Events, &json!({"cpID": "cp-1"})).unwrap();

    let events = store
        .get_all(&Query::all(Kind::Events).filter("cpID", "cp-1"))
        .unwrap();
    assert_eq!(events.len(), 1);
}
