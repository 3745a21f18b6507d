//! [`LyricStore`]: the lyric table and ownership-gated deletion.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{info, warn};

use crate::{
  Error, Result, codec,
  credential::CredentialHasher,
  gate::GatePassword,
  id::{LyricId, UserId},
  keys,
  kv::KeyValueStore,
  lyric::{Lyric, NewLyric, resolve_author},
  policy::{self, Actor},
};

/// Owns the lyric table. Identity comes from the caller as an [`Actor`];
/// this store never consults the user directory.
pub struct LyricStore<K> {
  kv:         Arc<K>,
  hasher:     CredentialHasher,
  post_gate:  GatePassword,
  write_lock: Mutex<()>,
}

impl<K: KeyValueStore> LyricStore<K> {
  pub fn new(kv: Arc<K>, hasher: CredentialHasher, post_gate: GatePassword) -> Self {
    Self { kv, hasher, post_gate, write_lock: Mutex::new(()) }
  }

  /// All lyrics, newest first. A point-in-time snapshot.
  pub fn list(&self) -> Result<Vec<Lyric>> { self.lyrics() }

  pub fn get(&self, id: &LyricId) -> Result<Option<Lyric>> {
    Ok(self.lyrics()?.into_iter().find(|l| &l.id == id))
  }

  /// Store a new lyric owned by `acting_user_id` at the head of the table.
  ///
  /// Title and content are stored verbatim, empty or not; checking them is
  /// the caller's job.
  pub fn create(&self, input: NewLyric, acting_user_id: &UserId) -> Result<Lyric> {
    let NewLyric { title, content, author } = input;

    let _guard = self.lock();
    let mut lyrics = self.lyrics()?;

    let lyric = Lyric {
      id: unused_id(&lyrics),
      title,
      content,
      author: resolve_author(&author),
      author_display_name: author.display_name().map(str::to_owned),
      user_id: acting_user_id.clone(),
      created_at: Utc::now(),
    };

    lyrics.insert(0, lyric.clone());
    self.save_lyrics(&lyrics)?;

    info!(lyric_id = %lyric.id, user_id = %lyric.user_id, "created lyric");
    Ok(lyric)
  }

  /// Remove `id` if `actor` owns it or is an admin.
  ///
  /// Returns [`Error::NotFound`] for an unknown id and [`Error::Forbidden`]
  /// when the actor may not delete it; in both cases the table is untouched.
  pub fn delete(&self, id: &LyricId, actor: &Actor) -> Result<()> {
    let _guard = self.lock();
    let mut lyrics = self.lyrics()?;

    let index = lyrics
      .iter()
      .position(|l| &l.id == id)
      .ok_or_else(|| Error::NotFound(id.to_string()))?;

    if !policy::can_delete(&lyrics[index], actor) {
      warn!(lyric_id = %id, actor = %actor.id, "delete denied");
      return Err(Error::Forbidden);
    }

    lyrics.remove(index);
    self.save_lyrics(&lyrics)?;

    info!(lyric_id = %id, actor = %actor.id, admin = actor.is_admin, "deleted lyric");
    Ok(())
  }

  // ── Post gate ─────────────────────────────────────────────────────────────

  /// Check `candidate` against the post gate password, which unlocks the
  /// add-lyric form. [`Self::create`] does not consult the gate.
  pub fn validate_post_password(&self, candidate: &str) -> Result<bool> {
    self.post_gate.unlock(&*self.kv, &self.hasher, candidate)
  }

  pub fn is_post_password_verified(&self) -> Result<bool> {
    self.post_gate.is_unlocked(&*self.kv)
  }

  /// Clear the post gate flag so the next post asks for the password again.
  pub fn lock_post_gate(&self) -> Result<()> { self.post_gate.lock(&*self.kv) }

  // ── Helpers ───────────────────────────────────────────────────────────────

  fn lock(&self) -> MutexGuard<'_, ()> {
    self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn lyrics(&self) -> Result<Vec<Lyric>> {
    codec::read_table(&*self.kv, keys::LYRICS)
  }

  fn save_lyrics(&self, lyrics: &[Lyric]) -> Result<()> {
    codec::write_table(&*self.kv, keys::LYRICS, lyrics)
  }
}

fn unused_id(lyrics: &[Lyric]) -> LyricId {
  loop {
    let id = LyricId::generate();
    if lyrics.iter().all(|l| l.id != id) {
      return id;
    }
  }
}
