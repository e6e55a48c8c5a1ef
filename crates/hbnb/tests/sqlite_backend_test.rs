use hbnb::model::{Amenity, EntityKind, Meta};
use hbnb::store::backend::StorageBackend;
use hbnb::store::{migrations, Criteria, SqliteBackend, SqliteStore};
use hbnb::{DataStore, HbnbApi};
use rusqlite::Connection;
use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn setup() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db").join("hbnb.sqlite3");
    (dir, path)
}

fn open(path: &Path) -> SqliteStore {
    SqliteStore::with_backend(SqliteBackend::open(path).unwrap())
}

#[test]
fn test_entities_survive_reopen() {
    let (_dir, path) = setup();
    let id = {
        let api = HbnbApi::new(open(&path));
        let wifi = api.create(EntityKind::Amenity, json!({"name": "Wifi"})).unwrap();
        wifi.id().to_string()
    };

    let store = open(&path);
    let amenity: Amenity = store.get(&id).unwrap().unwrap();
    assert_eq!(amenity.name, "Wifi");
    assert!(amenity.meta.is_active);
}

#[test]
fn test_soft_deleted_rows_stay_but_leave_get_all() {
    let (_dir, path) = setup();
    let api = HbnbApi::new(open(&path));
    let sauna = api.create(EntityKind::Amenity, json!({"name": "Sauna"})).unwrap();
    api.create(EntityKind::Amenity, json!({"name": "Pool"})).unwrap();
    api.delete(EntityKind::Amenity, sauna.id(), false).unwrap();

    let store = open(&path);
    let all: Vec<Amenity> = store.get_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Pool");
    assert!(store.get::<Amenity>(sauna.id()).unwrap().unwrap().meta.is_deleted);
}

#[test]
fn test_first_match_follows_insertion_order() {
    let (_dir, path) = setup();
    let store = open(&path);
    for name in ["Alpha", "Beta", "Gamma"] {
        let mut doc = json!({"name": name, "description": "", "category": "comfort"})
            .as_object()
            .unwrap()
            .clone();
        let meta = serde_json::to_value(Meta::new()).unwrap();
        doc.extend(meta.as_object().unwrap().clone());
        let amenity: Amenity = hbnb::model::from_document(doc).unwrap();
        store.add(&amenity).unwrap();
    }

    let first: Option<Amenity> = store
        .find_first(&Criteria::new().eq("category", "comfort"))
        .unwrap();
    assert_eq!(first.unwrap().name, "Alpha");
    assert!(store
        .find_first::<Amenity>(&Criteria::new().eq("category", "safety"))
        .unwrap()
        .is_none());
}

#[test]
fn test_schema_is_versioned_once() {
    let (_dir, path) = setup();
    drop(open(&path));
    drop(open(&path));

    let conn = Connection::open(&path).unwrap();
    assert_eq!(
        migrations::current_version(&conn).unwrap(),
        migrations::LATEST_VERSION
    );
    for kind in EntityKind::ALL {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [kind.table()],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1, "missing table for {kind}");
    }
}

#[test]
fn test_raw_backend_remove() {
    let (_dir, path) = setup();
    let backend = SqliteBackend::open(&path).unwrap();
    let doc = json!({"id": "a1", "is_deleted": false, "created_at": "", "updated_at": ""})
        .as_object()
        .unwrap()
        .clone();
    assert!(backend.insert(EntityKind::Amenity, "a1", &doc).unwrap());
    assert!(backend.remove(EntityKind::Amenity, "a1").unwrap());
    assert!(!backend.remove(EntityKind::Amenity, "a1").unwrap());
    assert!(backend.fetch(EntityKind::Amenity, "a1").unwrap().is_none());
}
