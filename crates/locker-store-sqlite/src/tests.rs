//! Integration tests for `SqliteStore`, on its own and under the core stores.

use std::{path::PathBuf, sync::Arc};

use locker_core::{
  Actor, AuthorFields, CredentialHasher, Error as CoreError, GatePassword,
  KeyValueStore, LyricStore, NewLyric, UserStore, keys,
};
use uuid::Uuid;

use crate::SqliteStore;

fn store() -> SqliteStore {
  SqliteStore::open_in_memory().expect("in-memory store")
}

fn hasher() -> CredentialHasher {
  CredentialHasher::with_params(8, 1, 1).unwrap()
}

fn user_store(kv: Arc<SqliteStore>) -> UserStore<SqliteStore> {
  let h = hasher();
  let gate = GatePassword::admin(h.hash("admin123").unwrap());
  UserStore::new(kv, h, gate)
}

fn lyric_store(kv: Arc<SqliteStore>) -> LyricStore<SqliteStore> {
  let h = hasher();
  let gate = GatePassword::post(h.hash("music123").unwrap());
  LyricStore::new(kv, h, gate)
}

/// A database path unique to one test, removed on drop.
struct TempDb(PathBuf);

impl TempDb {
  fn new() -> Self {
    Self(std::env::temp_dir().join(format!("locker-{}.db", Uuid::new_v4())))
  }
}

impl Drop for TempDb {
  fn drop(&mut self) {
    for suffix in ["", "-wal", "-shm"] {
      let mut path = self.0.clone().into_os_string();
      path.push(suffix);
      let _ = std::fs::remove_file(path);
    }
  }
}

// ─── Key-value semantics ─────────────────────────────────────────────────────

#[test]
fn get_missing_returns_none() {
  assert_eq!(store().get("nope").unwrap(), None);
}

#[test]
fn set_overwrites() {
  let s = store();
  s.set("k", "one").unwrap();
  s.set("k", "two").unwrap();
  assert_eq!(s.get("k").unwrap().as_deref(), Some("two"));
}

#[test]
fn remove_is_idempotent() {
  let s = store();
  s.set("k", "v").unwrap();
  s.remove("k").unwrap();
  s.remove("k").unwrap();
  assert_eq!(s.get("k").unwrap(), None);
}

#[test]
fn clones_share_the_connection() {
  let a = store();
  let b = a.clone();
  a.set("k", "v").unwrap();
  assert_eq!(b.get("k").unwrap().as_deref(), Some("v"));
}

#[test]
fn values_survive_reopen() {
  let db = TempDb::new();
  SqliteStore::open(&db.0).unwrap().set("k", "multi\nline ✓").unwrap();

  let reopened = SqliteStore::open(&db.0).unwrap();
  assert_eq!(reopened.get("k").unwrap().as_deref(), Some("multi\nline ✓"));
}

// ─── Under the core stores ───────────────────────────────────────────────────

#[test]
fn register_and_login_round_trip() {
  let kv = Arc::new(store());
  let users = user_store(kv.clone());
  users.bootstrap().unwrap();

  let alice = users.register("alice", "Alice", "a@x.com", "pw1").unwrap();
  users.logout().unwrap();
  assert!(matches!(users.login("alice", "wrong"), Err(CoreError::BadPassword)));
  assert_eq!(users.login("alice", "pw1").unwrap(), alice);
}

#[test]
fn session_is_restored_after_reopen() {
  let db = TempDb::new();
  let alice = {
    let users = user_store(Arc::new(SqliteStore::open(&db.0).unwrap()));
    users.bootstrap().unwrap();
    users.register("alice", "Alice", "a@x.com", "pw1").unwrap()
  };

  let users = user_store(Arc::new(SqliteStore::open(&db.0).unwrap()));
  assert!(!users.bootstrap().unwrap());
  assert_eq!(users.current_user().unwrap(), Some(alice));
  assert_eq!(users.list_users().unwrap().len(), 2);
}

#[test]
fn two_handles_see_each_others_writes() {
  let db = TempDb::new();
  let first = lyric_store(Arc::new(SqliteStore::open(&db.0).unwrap()));
  let second = lyric_store(Arc::new(SqliteStore::open(&db.0).unwrap()));

  let a = first
    .create(NewLyric::new("A", "a", AuthorFields::free_text("x")), &"u1".into())
    .unwrap();
  let b = second
    .create(NewLyric::new("B", "b", AuthorFields::free_text("y")), &"u2".into())
    .unwrap();

  let ids: Vec<_> = first.list().unwrap().into_iter().map(|l| l.id).collect();
  assert_eq!(ids, [b.id, a.id]);
}

#[test]
fn lyrics_share_substrate_with_users() {
  let kv = Arc::new(store());
  let users = user_store(kv.clone());
  let lyrics = lyric_store(kv.clone());
  users.bootstrap().unwrap();

  let alice = users.register("alice", "Alice", "a@x.com", "pw1").unwrap();
  let lyric = lyrics
    .create(NewLyric::new("T", "C", AuthorFields::from_user(&alice)), &alice.id)
    .unwrap();
  assert!(kv.get(keys::LYRICS).unwrap().unwrap().contains(lyric.id.as_str()));

  let bob = users.register("bob", "Bob", "b@x.com", "pw2").unwrap();
  assert!(matches!(
    lyrics.delete(&lyric.id, &Actor::from(&bob)),
    Err(CoreError::Forbidden)
  ));
  lyrics.delete(&lyric.id, &Actor::from(&alice)).unwrap();
  assert!(lyrics.list().unwrap().is_empty());
}
