//! Key-value store contract and implementations.
//!
//! # Responsibility
//! - Define the string key-value seam every persisted value goes through.
//! - Provide the SQLite-backed store used on device and an in-memory store.
//!
//! # Invariants
//! - `set` overwrites the whole value; there are no partial updates.
//! - `get` on an unset key returns `Ok(None)`, never an error.
//! - `write_batch` applies every write or none of them.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Keys of every persisted value.
pub mod keys {
    /// JSON array of courses.
    pub const COURSES: &str = "@gpa_calculator_courses";
    /// JSON array of custom grade scales.
    pub const CUSTOM_SCALES: &str = "@gpa_calculator_custom_scales";
    /// Selected scale name.
    pub const SELECTED_SCALE: &str = "@gpa_calculator_selected_scale";
    /// Theme name.
    pub const THEME: &str = "@gpa_calculator_theme";
    /// `"true"` or `"false"`.
    pub const DARK_MODE: &str = "@gpa_calculator_dark_mode";
    /// Stringified integer.
    pub const DECIMAL_PLACES: &str = "@gpa_calculator_decimal_places";

    /// Keys cleared by a preferences reset.
    pub const PREFERENCES: [&str; 3] = [THEME, DARK_MODE, DECIMAL_PLACES];
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage transport failure.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Backend-specific failure outside SQLite (e.g. a platform store).
    Backend(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Backend(message) => write!(f, "storage backend failed: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Backend(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One entry change inside a `write_batch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvWrite {
    Set { key: &'static str, value: String },
    Remove { key: &'static str },
}

/// String key-value persistence.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
    /// Removes every key.
    fn clear(&self) -> StoreResult<()>;
    /// Applies `writes` in order, atomically.
    fn write_batch(&self, writes: &[KvWrite]) -> StoreResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }

    fn clear(&self) -> StoreResult<()> {
        (**self).clear()
    }

    fn write_batch(&self, writes: &[KvWrite]) -> StoreResult<()> {
        (**self).write_batch(writes)
    }
}

/// SQLite-backed store over the `kv_entries` table.
pub struct SqliteKvStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvStore<'conn> {
    /// Wraps a migrated connection.
    ///
    /// Fails when `kv_entries` is missing, i.e. the connection did not come
    /// from `open_db`/`open_db_in_memory`.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'kv_entries'
            );",
            [],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(StoreError::Backend(
                "kv_entries table is missing; open the database with open_db".to_string(),
            ));
        }
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteKvStore<'_> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        upsert_entry(self.conn, key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        delete_entry(self.conn, key)
    }

    fn clear(&self) -> StoreResult<()> {
        self.conn.execute("DELETE FROM kv_entries;", [])?;
        Ok(())
    }

    fn write_batch(&self, writes: &[KvWrite]) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for write in writes {
            match write {
                KvWrite::Set { key, value } => upsert_entry(&tx, key, value)?,
                KvWrite::Remove { key } => delete_entry(&tx, key)?,
            }
        }
        tx.commit()?;
        Ok(())
    }
}

fn upsert_entry(conn: &Connection, key: &str, value: &str) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = (strftime('%s', 'now') * 1000);",
        params![key, value],
    )?;
    Ok(())
}

fn delete_entry(conn: &Connection, key: &str) -> StoreResult<()> {
    conn.execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
    Ok(())
}

/// Process-local store for tests and previews.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        self.entries.borrow_mut().clear();
        Ok(())
    }

    fn write_batch(&self, writes: &[KvWrite]) -> StoreResult<()> {
        let mut entries = self.entries.borrow_mut();
        for write in writes {
            match write {
                KvWrite::Set { key, value } => {
                    entries.insert((*key).to_string(), value.clone());
                }
                KvWrite::Remove { key } => {
                    entries.remove(*key);
                }
            }
        }
        Ok(())
    }
}
