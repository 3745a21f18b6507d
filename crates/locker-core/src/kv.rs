//! The `KeyValueStore` trait and an in-memory implementation.
//!
//! The trait is implemented by persistence backends (e.g.
//! `locker-store-sqlite`). [`UserStore`](crate::UserStore) and
//! [`LyricStore`](crate::LyricStore) depend on this abstraction, not on any
//! concrete backend.

use std::{
  collections::HashMap,
  convert::Infallible,
  sync::{Mutex, PoisonError},
};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A flat string-to-string map with single-key atomic writes.
///
/// All calls are synchronous and run to completion. Implementations must be
/// shareable across threads; the stores hold them behind an `Arc`.
pub trait KeyValueStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the value at `key`. Returns `None` if the key is absent.
  fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

  /// Insert or overwrite the value at `key`.
  fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;

  /// Remove `key`. Removing an absent key is not an error.
  fn remove(&self, key: &str) -> Result<(), Self::Error>;
}

// ─── MemoryStore ─────────────────────────────────────────────────────────────

/// A process-local [`KeyValueStore`]. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  pub fn len(&self) -> usize { self.entries().len() }

  pub fn is_empty(&self) -> bool { self.entries().is_empty() }

  fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
    // A panicking writer cannot leave a half-written String behind.
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl KeyValueStore for MemoryStore {
  type Error = Infallible;

  fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
    Ok(self.entries().get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
    self.entries().insert(key.to_owned(), value.to_owned());
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<(), Self::Error> {
    self.entries().remove(key);
    Ok(())
  }
}
