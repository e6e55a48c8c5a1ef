use crate::store::{SqliteBackend, SqliteStore};
use std::path::PathBuf;
use tempfile::TempDir;

/// A SQLite-backed store living in a fresh temporary directory.
pub struct TestEnv {
    // Keeps the directory alive for the duration of the test.
    pub _temp_dir: TempDir,
    pub store: SqliteStore,
    pub root: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let backend =
            SqliteBackend::open(&Self::db_path_in(&root)).expect("failed to open test database");
        Self {
            _temp_dir: temp_dir,
            store: SqliteStore::with_backend(backend),
            root,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        Self::db_path_in(&self.root)
    }

    /// A second store on the same database file.
    pub fn reopen(&self) -> SqliteStore {
        let backend = SqliteBackend::open(&self.db_path()).expect("failed to reopen test database");
        SqliteStore::with_backend(backend)
    }

    fn db_path_in(root: &std::path::Path) -> PathBuf {
        root.join("hbnb.sqlite3")
    }
}
