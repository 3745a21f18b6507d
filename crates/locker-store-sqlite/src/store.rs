//! [`SqliteStore`], the SQLite implementation of [`KeyValueStore`].

use std::{
  path::Path,
  sync::{Arc, Mutex, MutexGuard},
};

use locker_core::KeyValueStore;
use rusqlite::{Connection, OptionalExtension as _};
use tracing::debug;

use crate::{Error, Result, schema::SCHEMA};

/// A key-value substrate backed by a single SQLite file.
///
/// Cloning is cheap; clones share one connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = Connection::open(path)?;
    debug!(path = %path.display(), "opened sqlite store");
    Self::init(conn)
  }

  /// Open an in-memory store for tests.
  pub fn open_in_memory() -> Result<Self> {
    Self::init(Connection::open_in_memory()?)
  }

  fn init(conn: Connection) -> Result<Self> {
    conn.execute_batch(SCHEMA)?;
    Ok(Self { conn: Arc::new(Mutex::new(conn)) })
  }

  fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
    self.conn.lock().map_err(|_| Error::Poisoned)
  }
}

impl KeyValueStore for SqliteStore {
  type Error = Error;

  fn get(&self, key: &str) -> Result<Option<String>> {
    Ok(
      self
        .conn()?
        .query_row(
          "SELECT value FROM kv WHERE key = ?1",
          rusqlite::params![key],
          |row| row.get(0),
        )
        .optional()?,
    )
  }

  fn set(&self, key: &str, value: &str) -> Result<()> {
    self.conn()?.execute(
      "INSERT INTO kv (key, value) VALUES (?1, ?2)
       ON CONFLICT(key) DO UPDATE SET value = excluded.value",
      rusqlite::params![key, value],
    )?;
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<()> {
    self
      .conn()?
      .execute("DELETE FROM kv WHERE key = ?1", rusqlite::params![key])?;
    Ok(())
  }
}
