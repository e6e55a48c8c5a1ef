use super::backend::StorageBackend;
use super::criteria::Criteria;
use super::migrations;
use crate::error::{HbnbError, Result};
use crate::model::{EntityKind, FieldMap};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::debug;

/// SQLite storage backend.
///
/// One table per entity kind. The entity document lives in the `body` JSON
/// column; `is_deleted` and the timestamps are mirrored into columns so
/// `fetch_all` can leave out soft-deleted rows in SQL. Every call commits on
/// its own: a cascade is a sequence of independent statements.
pub struct SqliteBackend {
    conn: Connection,
}

fn decode(body: &str) -> Result<FieldMap> {
    Ok(serde_json::from_str(body)?)
}

fn deleted_flag(doc: &FieldMap) -> bool {
    doc.get("is_deleted")
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

fn timestamp(doc: &FieldMap, field: &str) -> String {
    doc.get(field)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

impl SqliteBackend {
    /// Open (creating if needed) a database file and bring its schema up to date.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON;")?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrations::run_migrations(&conn)?;
        Ok(Self { conn })
    }

    fn bodies(&self, sql: &str) -> Result<Vec<FieldMap>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut docs = Vec::new();
        for body in rows {
            docs.push(decode(&body?)?);
        }
        Ok(docs)
    }
}

impl StorageBackend for SqliteBackend {
    fn insert(&self, kind: EntityKind, id: &str, doc: &FieldMap) -> Result<bool> {
        let body = serde_json::to_string(doc)?;
        let changed = self.conn.execute(
            &format!(
                "INSERT OR IGNORE INTO {} (id, is_deleted, created_at, updated_at, body)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                kind.table()
            ),
            params![
                id,
                deleted_flag(doc),
                timestamp(doc, "created_at"),
                timestamp(doc, "updated_at"),
                body
            ],
        )?;
        debug!("insert {kind} {id}: {changed} row(s)");
        Ok(changed == 1)
    }

    fn fetch(&self, kind: EntityKind, id: &str) -> Result<Option<FieldMap>> {
        let body: Option<String> = self
            .conn
            .query_row(
                &format!("SELECT body FROM {} WHERE id = ?1", kind.table()),
                [id],
                |row| row.get(0),
            )
            .optional()?;
        body.map(|b| decode(&b)).transpose()
    }

    fn fetch_all(&self, kind: EntityKind) -> Result<Vec<FieldMap>> {
        self.bodies(&format!(
            "SELECT body FROM {} WHERE is_deleted = 0 ORDER BY rowid",
            kind.table()
        ))
    }

    fn scan(&self, kind: EntityKind, criteria: &Criteria) -> Result<Vec<FieldMap>> {
        let docs = self.bodies(&format!("SELECT body FROM {} ORDER BY rowid", kind.table()))?;
        Ok(docs.into_iter().filter(|d| criteria.matches(d)).collect())
    }

    fn replace(&self, kind: EntityKind, id: &str, doc: &FieldMap) -> Result<bool> {
        let body = serde_json::to_string(doc)?;
        let changed = self.conn.execute(
            &format!(
                "UPDATE {} SET is_deleted = ?2, updated_at = ?3, body = ?4 WHERE id = ?1",
                kind.table()
            ),
            params![id, deleted_flag(doc), timestamp(doc, "updated_at"), body],
        )?;
        debug!("replace {kind} {id}: {changed} row(s)");
        Ok(changed > 0)
    }

    fn remove(&self, kind: EntityKind, id: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute(&format!("DELETE FROM {} WHERE id = ?1", kind.table()), [id])?;
        debug!("remove {kind} {id}: {changed} row(s)");
        if changed > 1 {
            return Err(HbnbError::Store(format!(
                "removed {changed} rows for {kind} {id}"
            )));
        }
        Ok(changed == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, deleted: bool) -> FieldMap {
        json!({
            "id": id,
            "is_deleted": deleted,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
            "owner_id": "o1",
        })
        .as_object()
        .unwrap()
        .clone()
    }

    #[test]
    fn fetch_all_excludes_deleted_but_scan_does_not() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        backend.insert(EntityKind::Listing, "a", &doc("a", false)).unwrap();
        backend.insert(EntityKind::Listing, "b", &doc("b", true)).unwrap();

        assert_eq!(backend.fetch_all(EntityKind::Listing).unwrap().len(), 1);
        let all = backend
            .scan(EntityKind::Listing, &Criteria::new().eq("owner_id", "o1"))
            .unwrap();
        assert_eq!(all.len(), 2);
        assert!(backend.fetch(EntityKind::Listing, "b").unwrap().is_some());
    }

    #[test]
    fn duplicate_insert_is_refused() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        assert!(backend.insert(EntityKind::Amenity, "a", &doc("a", false)).unwrap());
        assert!(!backend.insert(EntityKind::Amenity, "a", &doc("a", false)).unwrap());
    }

    #[test]
    fn replace_updates_deleted_column() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        backend.insert(EntityKind::Review, "r", &doc("r", false)).unwrap();
        assert!(backend.replace(EntityKind::Review, "r", &doc("r", true)).unwrap());
        assert!(backend.fetch_all(EntityKind::Review).unwrap().is_empty());
        assert!(backend.remove(EntityKind::Review, "r").unwrap());
        assert!(!backend.remove(EntityKind::Review, "r").unwrap());
    }

    #[test]
    fn commands_run_on_a_file_database() {
        use crate::commands::{create, delete};
        use crate::context::Context;
        use crate::credentials::Sha256Hasher;
        use crate::model::Account;
        use crate::store::memory::fixtures::account_data;
        use crate::store::DataStore;
        use crate::test_utils::TestEnv;

        let env = TestEnv::new();
        let ctx = Context::new(&env.store, &Sha256Hasher);
        let alice: Account = create::run(&ctx, account_data("alice")).unwrap();
        delete::run::<Account, _>(&ctx, &alice.meta.id).unwrap();

        let reopened = env.reopen();
        let stored: Account = reopened.get(&alice.meta.id).unwrap().unwrap();
        assert!(stored.meta.is_deleted);
        assert!(reopened.get_all::<Account>().unwrap().is_empty());
        assert!(env.db_path().exists());
    }
}
