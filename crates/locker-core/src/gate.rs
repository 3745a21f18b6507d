//! Gate passwords: fixed, process-wide secrets that unlock parts of the UI.
//!
//! A gate is not per-user authentication. It is a single shared secret that,
//! once supplied, sets a flag in the substrate until explicitly locked again.
//! There are two: the admin gate (unlocks the admin panel independently of
//! [`User::is_admin`](crate::User)) and the post gate (unlocks the
//! add-lyric form).

use tracing::{info, warn};

use crate::{
  Result, codec,
  credential::CredentialHasher,
  keys,
  kv::KeyValueStore,
};

#[derive(Debug, Clone)]
pub struct GatePassword {
  /// PHC string of the gate secret.
  hash:     String,
  flag_key: &'static str,
}

impl GatePassword {
  /// The admin-panel gate, flagged under [`keys::ADMIN_GATE_VERIFIED`].
  pub fn admin(hash: impl Into<String>) -> Self {
    Self { hash: hash.into(), flag_key: keys::ADMIN_GATE_VERIFIED }
  }

  /// The add-lyric gate, flagged under [`keys::POST_GATE_VERIFIED`].
  pub fn post(hash: impl Into<String>) -> Self {
    Self { hash: hash.into(), flag_key: keys::POST_GATE_VERIFIED }
  }

  pub fn flag_key(&self) -> &'static str { self.flag_key }

  /// Check `candidate`; on a match, persist the unlocked flag.
  pub(crate) fn unlock<K: KeyValueStore + ?Sized>(
    &self,
    kv: &K,
    hasher: &CredentialHasher,
    candidate: &str,
  ) -> Result<bool> {
    if !hasher.verify(candidate, &self.hash) {
      warn!(gate = self.flag_key, "gate password rejected");
      return Ok(false);
    }
    codec::write_flag(kv, self.flag_key, true)?;
    info!(gate = self.flag_key, "gate unlocked");
    Ok(true)
  }

  pub(crate) fn is_unlocked<K: KeyValueStore + ?Sized>(
    &self,
    kv: &K,
  ) -> Result<bool> {
    codec::read_flag(kv, self.flag_key)
  }

  pub(crate) fn lock<K: KeyValueStore + ?Sized>(&self, kv: &K) -> Result<()> {
    codec::write_flag(kv, self.flag_key, false)
  }
}
