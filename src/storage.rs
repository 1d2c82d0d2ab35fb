//! Local persistence: a small key-value store of text blobs.
//!
//! Everything pinlog keeps lives in one `SQLite` file under the storage root:
//!
//! ```text
//! <root>/
//!   pinlog.sqlite    # blobs(key, value): "workouts" and "view"
//! ```
//!
//! Callers only see [`BlobStore`]: get, set and remove a blob by key.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use rusqlite::{Connection, OptionalExtension};

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// An opaque key-value store of text blobs.
pub trait BlobStore {
    /// Returns the blob stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing what was there.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes the blob under `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// `SQLite`-backed blob store.
pub struct Storage {
    root: PathBuf,
    conn: Connection,
}

impl Storage {
    /// Opens (or creates) the store rooted at the given directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let conn = Connection::open(root.join("pinlog.sqlite"))?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS blobs (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )?;
        tracing::debug!(root = %root.display(), "opened storage");
        Ok(Self { root, conn })
    }

    /// Returns the default storage root: `~/.pinlog/`.
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".pinlog"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BlobStore for Storage {
    /// A value that isn't valid UTF-8 text reads as missing.
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM blobs WHERE key = ?1", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional();
        match value {
            Ok(value) => Ok(value),
            Err(
                e @ (rusqlite::Error::FromSqlConversionFailure(..)
                | rusqlite::Error::InvalidColumnType(..)),
            ) => {
                tracing::warn!(key, error = %e, "stored blob is not text, ignoring it");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO blobs (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![key, value],
        )?;
        tracing::trace!(key, bytes = value.len(), "stored blob");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM blobs WHERE key = ?1", [key])?;
        Ok(())
    }
}

/// In-memory store for tests, with switchable write failures.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    blobs: std::cell::RefCell<std::collections::HashMap<String, String>>,
    fail_writes: std::cell::Cell<bool>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn with_blob(key: &str, value: &str) -> Self {
        let store = Self::default();
        store
            .blobs
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        store
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.blobs.borrow().get(key).cloned()
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.get() {
            return Err(io::Error::other("disk full").into());
        }
        Ok(())
    }
}

#[cfg(test)]
impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_writable()?;
        self.blobs
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.check_writable()?;
        self.blobs.borrow_mut().remove(key);
        Ok(())
    }
}
