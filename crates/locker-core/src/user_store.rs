//! [`UserStore`]: the user directory, credentials, and session pointer.
//!
//! Every mutation re-reads its table from the substrate before writing it
//! back. Within one process the read-modify-write cycle is serialised; across
//! processes sharing a substrate the last writer wins.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{info, warn};

use crate::{
  Error, Result, codec,
  credential::CredentialHasher,
  gate::GatePassword,
  id::UserId,
  keys,
  kv::KeyValueStore,
  policy,
  user::{Session, User},
};

/// Owns users, their credentials, and who is logged in.
pub struct UserStore<K> {
  kv:              Arc<K>,
  hasher:          CredentialHasher,
  admin_gate:      GatePassword,
  /// PHC string installed as the seed admin's credential on bootstrap.
  seed_credential: Option<String>,
  write_lock:      Mutex<()>,
}

impl<K: KeyValueStore> UserStore<K> {
  pub fn new(
    kv: Arc<K>,
    hasher: CredentialHasher,
    admin_gate: GatePassword,
  ) -> Self {
    Self {
      kv,
      hasher,
      admin_gate,
      seed_credential: None,
      write_lock: Mutex::new(()),
    }
  }

  /// Give the seed admin a credential so it can log in. Without one the seed
  /// account exists but every login to it fails with [`Error::BadPassword`].
  pub fn with_seed_credential(mut self, phc: impl Into<String>) -> Self {
    self.seed_credential = Some(phc.into());
    self
  }

  // ── Bootstrap ─────────────────────────────────────────────────────────────

  /// Insert the seed admin if the directory is empty. Returns `true` if it
  /// did. Calling it on a non-empty directory changes nothing.
  pub fn bootstrap(&self) -> Result<bool> {
    let _guard = self.lock();
    if !self.users()?.is_empty() {
      return Ok(false);
    }

    let admin = User::seed_admin();
    self.save_users(std::slice::from_ref(&admin))?;
    if let Some(phc) = &self.seed_credential {
      codec::write_raw(&*self.kv, &keys::credential(&admin.id), phc)?;
    }

    info!(user_id = %admin.id, "seeded admin user");
    Ok(true)
  }

  // ── Authentication ────────────────────────────────────────────────────────

  /// Create a non-admin account and log in as it.
  ///
  /// Username collisions are reported before email collisions.
  pub fn register(
    &self,
    username: &str,
    display_name: &str,
    email: &str,
    password: &str,
  ) -> Result<User> {
    let _guard = self.lock();
    let mut users = self.users()?;

    if users.iter().any(|u| u.username == username) {
      warn!(username, "registration rejected: username taken");
      return Err(Error::DuplicateUsername(username.to_owned()));
    }
    if users.iter().any(|u| u.email == email) {
      warn!(username, "registration rejected: email in use");
      return Err(Error::DuplicateEmail(email.to_owned()));
    }

    let user = User {
      id:           unused_id(&users),
      username:     username.to_owned(),
      display_name: display_name.to_owned(),
      email:        email.to_owned(),
      is_admin:     false,
      created_at:   Utc::now(),
    };
    let phc = self.hasher.hash(password)?;

    users.push(user.clone());
    self.save_users(&users)?;
    codec::write_raw(&*self.kv, &keys::credential(&user.id), &phc)?;
    self.switch_session(&user)?;

    info!(user_id = %user.id, username, "registered user");
    Ok(user)
  }

  /// Log in as `username`. On failure the session is left as it was.
  ///
  /// Logging in as someone other than the current user relocks the admin
  /// gate.
  pub fn login(&self, username: &str, password: &str) -> Result<User> {
    let Some(user) = self.users()?.into_iter().find(|u| u.username == username)
    else {
      warn!(username, "login failed: no such user");
      return Err(Error::UserNotFound(username.to_owned()));
    };

    let stored = codec::read_raw(&*self.kv, &keys::credential(&user.id))?;
    let verified = stored
      .as_deref()
      .is_some_and(|phc| self.hasher.verify(password, phc));
    if !verified {
      warn!(username, "login failed: bad password");
      return Err(Error::BadPassword);
    }

    self.switch_session(&user)?;
    info!(user_id = %user.id, username, "logged in");
    Ok(user)
  }

  /// Clear the session pointer and the admin gate. Succeeds when already
  /// logged out.
  pub fn logout(&self) -> Result<()> {
    self.save_session(None)?;
    self.admin_gate.lock(&*self.kv)?;
    info!("logged out");
    Ok(())
  }

  // ── Session ───────────────────────────────────────────────────────────────

  /// The logged-in user as last written to the session pointer.
  pub fn current_user(&self) -> Result<Option<User>> {
    codec::read_value(&*self.kv, keys::CURRENT_USER)
  }

  pub fn session(&self) -> Result<Session> { Ok(self.current_user()?.into()) }

  pub fn is_authenticated(&self) -> Result<bool> {
    Ok(self.current_user()?.is_some())
  }

  /// Reconcile the session snapshot with the directory. A session whose user
  /// has since been deleted (e.g. by another process) is cleared; otherwise
  /// the snapshot is replaced by the directory's copy.
  pub fn refresh_session(&self) -> Result<Option<User>> {
    let Some(current) = self.current_user()? else {
      return Ok(None);
    };

    match self.find_user(&current.id)? {
      Some(fresh) => {
        if fresh != current {
          self.save_session(Some(&fresh))?;
        }
        Ok(Some(fresh))
      }
      None => {
        warn!(user_id = %current.id, "session user no longer exists");
        self.logout()?;
        Ok(None)
      }
    }
  }

  // ── Directory ─────────────────────────────────────────────────────────────

  /// All users in insertion order.
  pub fn list_users(&self) -> Result<Vec<User>> { self.users() }

  pub fn find_user(&self, id: &UserId) -> Result<Option<User>> {
    Ok(self.users()?.into_iter().find(|u| &u.id == id))
  }

  /// Set `id`'s admin flag. If `id` is the logged-in user, the session
  /// snapshot is updated to match.
  pub fn set_admin(&self, id: &UserId, granted: bool) -> Result<User> {
    self.update_admin(id, |_| granted)
  }

  /// Flip `id`'s admin flag; otherwise identical to [`Self::set_admin`].
  pub fn toggle_admin(&self, id: &UserId) -> Result<User> {
    self.update_admin(id, |current| !current)
  }

  /// Remove `id` and its credential. Lyrics it owns are left in place. If
  /// `id` is the logged-in user, the session is logged out.
  pub fn delete_user(&self, id: &UserId) -> Result<()> {
    let _guard = self.lock();
    let users = self.users()?;
    let before = users.len();
    let remaining: Vec<User> = users.into_iter().filter(|u| &u.id != id).collect();

    if remaining.len() == before {
      return Err(Error::NotFound(id.to_string()));
    }

    self.save_users(&remaining)?;
    codec::remove(&*self.kv, &keys::credential(id))?;
    info!(user_id = %id, "deleted user");

    if self.is_current(id)? {
      self.logout()?;
    }
    Ok(())
  }

  // ── Admin gate ────────────────────────────────────────────────────────────

  /// Check `candidate` against the admin gate password. A match unlocks the
  /// admin panel until the session ends or changes hands, whatever the
  /// current user's admin flag.
  pub fn validate_admin_password(&self, candidate: &str) -> Result<bool> {
    self.admin_gate.unlock(&*self.kv, &self.hasher, candidate)
  }

  pub fn is_admin_gate_unlocked(&self) -> Result<bool> {
    self.admin_gate.is_unlocked(&*self.kv)
  }

  /// Whether the admin panel should open: the current user is an admin, or
  /// the admin gate has been unlocked.
  pub fn can_access_admin_panel(&self) -> Result<bool> {
    let user = self.current_user()?;
    Ok(policy::can_access_admin_panel(
      user.as_ref(),
      self.is_admin_gate_unlocked()?,
    ))
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  fn lock(&self) -> MutexGuard<'_, ()> {
    self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn users(&self) -> Result<Vec<User>> {
    codec::read_table(&*self.kv, keys::USERS)
  }

  fn save_users(&self, users: &[User]) -> Result<()> {
    codec::write_table(&*self.kv, keys::USERS, users)
  }

  fn save_session(&self, user: Option<&User>) -> Result<()> {
    codec::write_value(&*self.kv, keys::CURRENT_USER, user)
  }

  /// Point the session at `user`. The admin gate belongs to the session it
  /// was unlocked in, so it is relocked whenever the user changes.
  fn switch_session(&self, user: &User) -> Result<()> {
    if !self.is_current(&user.id)? {
      self.admin_gate.lock(&*self.kv)?;
    }
    self.save_session(Some(user))
  }

  fn is_current(&self, id: &UserId) -> Result<bool> {
    Ok(self.current_user()?.is_some_and(|u| &u.id == id))
  }

  fn update_admin(
    &self,
    id: &UserId,
    next: impl FnOnce(bool) -> bool,
  ) -> Result<User> {
    let _guard = self.lock();
    let mut users = self.users()?;
    let user = users
      .iter_mut()
      .find(|u| &u.id == id)
      .ok_or_else(|| Error::NotFound(id.to_string()))?;

    user.is_admin = next(user.is_admin);
    let updated = user.clone();
    self.save_users(&users)?;

    if self.is_current(id)? {
      self.save_session(Some(&updated))?;
    }

    info!(user_id = %id, is_admin = updated.is_admin, "updated admin status");
    Ok(updated)
  }
}

fn unused_id(users: &[User]) -> UserId {
  loop {
    let id = UserId::generate();
    if users.iter().all(|u| u.id != id) {
      return id;
    }
  }
}
