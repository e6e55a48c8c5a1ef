//! Migration runner: version tracking, forward-only, transactional per migration.

use crate::error::{HbnbError, Result};
use crate::model::EntityKind;
use rusqlite::Connection;
use tracing::{debug, info, warn};

pub const LATEST_VERSION: u32 = 2;

type MigrationFn = fn(&Connection) -> Result<()>;

const MIGRATIONS: [(u32, &str, MigrationFn); 2] = [
    (1, "entity_tables", v001_entity_tables),
    (2, "deleted_indexes", v002_deleted_indexes),
];

fn v001_entity_tables(conn: &Connection) -> Result<()> {
    for kind in EntityKind::ALL {
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id          TEXT PRIMARY KEY,
                is_deleted  INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL,
                body        TEXT NOT NULL
            );",
            table = kind.table()
        ))?;
    }
    Ok(())
}

fn v002_deleted_indexes(conn: &Connection) -> Result<()> {
    for kind in EntityKind::ALL {
        conn.execute_batch(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_is_deleted ON {table} (is_deleted);",
            table = kind.table()
        ))?;
    }
    Ok(())
}

/// Current schema version; 0 on a fresh database.
pub fn current_version(conn: &Connection) -> Result<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;
    let version: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Run all pending migrations. Returns how many were applied.
pub fn run_migrations(conn: &Connection) -> Result<u32> {
    let current = current_version(conn)?;
    if current >= LATEST_VERSION {
        debug!("database schema is up to date (v{current})");
        return Ok(0);
    }

    info!("running migrations: v{current} -> v{LATEST_VERSION}");
    let mut applied = 0;

    for &(version, name, migrate_fn) in &MIGRATIONS {
        if version <= current {
            continue;
        }
        debug!("applying migration v{version:03}: {name}");
        conn.execute_batch("BEGIN IMMEDIATE")?;

        let outcome = migrate_fn(conn).and_then(|()| {
            conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
            conn.execute_batch("COMMIT")?;
            Ok(())
        });

        if let Err(e) = outcome {
            warn!("migration v{version:03} failed: {e}, rolling back");
            let _ = conn.execute_batch("ROLLBACK");
            return Err(HbnbError::Store(format!(
                "migration v{version:03} ({name}) failed: {e}"
            )));
        }
        applied += 1;
    }

    info!("applied {applied} migration(s)");
    Ok(applied)
}
