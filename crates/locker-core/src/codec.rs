//! Encoding helpers between domain types and the JSON blobs stored in the
//! key-value substrate.
//!
//! Tables are JSON arrays under a single key. A missing key reads as an empty
//! table. A blob that fails to parse is logged and also read as empty: a
//! corrupt table must not lock the user out of the board. Substrate errors are
//! never swallowed.

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{Error, Result, kv::KeyValueStore};

const TRUE: &str = "true";

// ─── Raw ─────────────────────────────────────────────────────────────────────

pub fn read_raw<K: KeyValueStore + ?Sized>(
  kv: &K,
  key: &str,
) -> Result<Option<String>> {
  kv.get(key).map_err(Error::storage)
}

pub fn write_raw<K: KeyValueStore + ?Sized>(
  kv: &K,
  key: &str,
  value: &str,
) -> Result<()> {
  kv.set(key, value).map_err(Error::storage)
}

pub fn remove<K: KeyValueStore + ?Sized>(kv: &K, key: &str) -> Result<()> {
  kv.remove(key).map_err(Error::storage)
}

// ─── Tables ──────────────────────────────────────────────────────────────────

pub fn read_table<K, T>(kv: &K, key: &str) -> Result<Vec<T>>
where
  K: KeyValueStore + ?Sized,
  T: DeserializeOwned,
{
  let Some(raw) = read_raw(kv, key)? else {
    return Ok(Vec::new());
  };

  match serde_json::from_str::<Vec<T>>(&raw) {
    Ok(rows) => {
      debug!(key, rows = rows.len(), "read table");
      Ok(rows)
    }
    Err(err) => {
      warn!(key, error = %err, "unparsable table, treating as empty");
      Ok(Vec::new())
    }
  }
}

pub fn write_table<K, T>(kv: &K, key: &str, rows: &[T]) -> Result<()>
where
  K: KeyValueStore + ?Sized,
  T: Serialize,
{
  let raw = serde_json::to_string(rows)?;
  write_raw(kv, key, &raw)?;
  debug!(key, rows = rows.len(), "wrote table");
  Ok(())
}

// ─── Single values ───────────────────────────────────────────────────────────

pub fn read_value<K, T>(kv: &K, key: &str) -> Result<Option<T>>
where
  K: KeyValueStore + ?Sized,
  T: DeserializeOwned,
{
  let Some(raw) = read_raw(kv, key)? else {
    return Ok(None);
  };

  match serde_json::from_str(&raw) {
    Ok(value) => Ok(Some(value)),
    Err(err) => {
      warn!(key, error = %err, "unparsable value, treating as absent");
      Ok(None)
    }
  }
}

/// Write `value` at `key`, or remove the key when `value` is `None`.
pub fn write_value<K, T>(kv: &K, key: &str, value: Option<&T>) -> Result<()>
where
  K: KeyValueStore + ?Sized,
  T: Serialize,
{
  match value {
    Some(value) => write_raw(kv, key, &serde_json::to_string(value)?),
    None => remove(kv, key),
  }
}

// ─── Flags ───────────────────────────────────────────────────────────────────

pub fn read_flag<K: KeyValueStore + ?Sized>(kv: &K, key: &str) -> Result<bool> {
  Ok(read_raw(kv, key)?.as_deref() == Some(TRUE))
}

pub fn write_flag<K: KeyValueStore + ?Sized>(
  kv: &K,
  key: &str,
  on: bool,
) -> Result<()> {
  if on { write_raw(kv, key, TRUE) } else { remove(kv, key) }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::kv::MemoryStore;

  #[test]
  fn missing_table_is_empty() {
    let kv = MemoryStore::new();
    let rows: Vec<String> = read_table(&kv, "t").unwrap();
    assert!(rows.is_empty());
  }

  #[test]
  fn corrupt_table_is_empty() {
    let kv = MemoryStore::new();
    kv.set("t", "[{\"not\": json").unwrap();
    let rows: Vec<String> = read_table(&kv, "t").unwrap();
    assert!(rows.is_empty());
  }

  #[test]
  fn table_preserves_order() {
    let kv = MemoryStore::new();
    write_table(&kv, "t", &["b", "a", "c"]).unwrap();
    let rows: Vec<String> = read_table(&kv, "t").unwrap();
    assert_eq!(rows, ["b", "a", "c"]);
  }

  #[test]
  fn corrupt_value_is_absent() {
    let kv = MemoryStore::new();
    kv.set("v", "{").unwrap();
    let value: Option<u32> = read_value(&kv, "v").unwrap();
    assert!(value.is_none());
  }

  #[test]
  fn writing_none_removes_value() {
    let kv = MemoryStore::new();
    write_value(&kv, "v", Some(&7u32)).unwrap();
    assert_eq!(read_value::<_, u32>(&kv, "v").unwrap(), Some(7));

    write_value::<_, u32>(&kv, "v", None).unwrap();
    assert!(kv.get("v").unwrap().is_none());
  }

  #[test]
  fn flags_only_accept_true() {
    let kv = MemoryStore::new();
    assert!(!read_flag(&kv, "f").unwrap());

    kv.set("f", "yes").unwrap();
    assert!(!read_flag(&kv, "f").unwrap());

    write_flag(&kv, "f", true).unwrap();
    assert!(read_flag(&kv, "f").unwrap());

    write_flag(&kv, "f", false).unwrap();
    assert!(kv.get("f").unwrap().is_none());
  }
}
