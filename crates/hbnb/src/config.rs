//! # Configuration
//!
//! Configuration is managed by [`confique`], layered in priority order:
//!
//! 1. **Environment variables**: `HBNB_STORAGE`, `HBNB_DATABASE_PATH`, `HBNB_LOG`
//! 2. **Config file**: an optional TOML file passed to [`HbnbConfig::load`]
//! 3. **Compiled defaults**: via `#[config(default = ...)]`
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `storage` | `memory` | Backend: `memory` or `sqlite` |
//! | `database_path` | `<data dir>/hbnb.sqlite3` | SQLite database file |
//! | `log_filter` | `info` | `tracing` filter directive |

use crate::error::{HbnbError, Result};
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const DATABASE_FILE: &str = "hbnb.sqlite3";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Memory,
    Sqlite,
}

impl FromStr for StorageKind {
    type Err = HbnbError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageKind::Memory),
            "sqlite" => Ok(StorageKind::Sqlite),
            other => Err(HbnbError::Config(format!(
                "unknown storage backend '{other}' (expected 'memory' or 'sqlite')"
            ))),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StorageKind::Memory => "memory",
            StorageKind::Sqlite => "sqlite",
        })
    }
}

/// Library configuration, optionally stored in `hbnb.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HbnbConfig {
    /// Storage backend: "memory" or "sqlite".
    #[config(env = "HBNB_STORAGE", default = "memory")]
    pub storage: String,

    /// SQLite database file. When absent, a file in the platform data directory.
    #[config(env = "HBNB_DATABASE_PATH")]
    pub database_path: Option<PathBuf>,

    #[config(env = "HBNB_LOG", default = "info")]
    pub log_filter: String,
}

impl Default for HbnbConfig {
    fn default() -> Self {
        Self {
            storage: StorageKind::Memory.to_string(),
            database_path: None,
            log_filter: "info".to_string(),
        }
    }
}

impl HbnbConfig {
    /// Loads environment over `file` (if given) over defaults.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(path) = file {
            builder = builder.file(path);
        }
        builder.load().map_err(|e| HbnbError::Config(e.to_string()))
    }

    pub fn storage_kind(&self) -> Result<StorageKind> {
        self.storage.parse()
    }

    /// The configured database path, or `hbnb.sqlite3` in the platform data
    /// directory (the working directory if there is none).
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.database_path {
            return path.clone();
        }
        ProjectDirs::from("", "", "hbnb")
            .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
            .unwrap_or_else(|| PathBuf::from(DATABASE_FILE))
    }
}
